use crate::TaleResult;

use std::path::Path;

use tale_config::RuntimeConfig;

/// The exact invocation used to launch an artifact:
/// `<java> -Xms<min> -Xmx<max> -jar <artifact>`.
///
/// The same value drives both spawning and recognising the instance in the
/// process table, so a process only counts as ours when its argument
/// vector is identical.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    program: String,
    args: Vec<String>,
}

impl LaunchCommand {
    pub fn new(runtime: &RuntimeConfig, artifact: &str) -> TaleResult<Self> {
        let heap_min = runtime.heap_min()?;
        let heap_max = runtime.heap_max()?;

        Ok(Self {
            program: runtime.java.clone(),
            args: vec![
                format!("-Xms{heap_min}"),
                format!("-Xmx{heap_max}"),
                String::from("-jar"),
                artifact.to_string(),
            ],
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Full argument-vector equality. `argv[0]` is compared by file name
    /// since the OS may report either `java` or `/usr/bin/java`.
    pub fn matches(&self, cmd: &[String]) -> bool {
        let Some((argv0, rest)) = cmd.split_first() else {
            return false;
        };

        let expected = Path::new(&self.program).file_name();
        expected.is_some() && Path::new(argv0).file_name() == expected && rest == self.args.as_slice()
    }
}

impl std::fmt::Display for LaunchCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.program, self.args.join(" "))
    }
}
