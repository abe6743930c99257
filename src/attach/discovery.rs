//! Enumerate local HotSpot JVMs the way `jps` does: every JVM publishes a
//! performance data file named after its pid under `hsperfdata_<user>`.

use crate::transport::ProcessDescriptor;
use procfs::process::Process;
use std::collections::BTreeSet;
use std::io;
use std::path::Path;

const PERFDATA_PREFIX: &str = "hsperfdata_";
const UNKNOWN_NAME: &str = "Unknown";

/// Launcher options whose value is the next argument.
const OPTIONS_WITH_VALUE: &[&str] = &[
    "-cp",
    "-classpath",
    "--class-path",
    "-p",
    "--module-path",
    "--add-opens",
    "--add-exports",
    "--add-modules",
];

/// List live JVMs that published performance data under `tmp_dir`.
pub fn list_java_processes(tmp_dir: &Path) -> io::Result<Vec<ProcessDescriptor>> {
    let processes = perfdata_pids(tmp_dir)?
        .into_iter()
        .filter_map(|pid| {
            let process = Process::new(pid as i32).ok()?;
            let display_name = match process.cmdline() {
                Ok(args) if !args.is_empty() => display_name_from_cmdline(&args),
                _ => UNKNOWN_NAME.to_string(),
            };
            Some(ProcessDescriptor::new(pid, display_name))
        })
        .collect();
    Ok(processes)
}

/// Pids named by the files of every `hsperfdata_*` directory, sorted.
///
/// Files of dead processes are included; callers filter on liveness.
pub fn perfdata_pids(tmp_dir: &Path) -> io::Result<BTreeSet<u32>> {
    let mut pids = BTreeSet::new();

    for entry in std::fs::read_dir(tmp_dir)? {
        let entry = entry?;
        let is_perfdata = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with(PERFDATA_PREFIX));
        if !is_perfdata || !entry.file_type()?.is_dir() {
            continue;
        }

        let dir = match std::fs::read_dir(entry.path()) {
            Ok(dir) => dir,
            Err(e) => {
                tracing::debug!("Skipping {}: {}", entry.path().display(), e);
                continue;
            }
        };
        for file in dir.flatten() {
            if let Some(pid) = file.file_name().to_str().and_then(|n| n.parse().ok()) {
                pids.insert(pid);
            }
        }
    }

    Ok(pids)
}

/// Main class (or jar) followed by its arguments, skipping the launcher and
/// JVM options.
pub fn display_name_from_cmdline(args: &[String]) -> String {
    let mut iter = args.iter().skip(1);

    while let Some(arg) = iter.next() {
        if OPTIONS_WITH_VALUE.contains(&arg.as_str()) {
            iter.next();
            continue;
        }
        if arg == "-jar" {
            return join_rest(iter.next(), iter);
        }
        if arg.starts_with('-') {
            continue;
        }
        return join_rest(Some(arg), iter);
    }

    UNKNOWN_NAME.to_string()
}

fn join_rest<'a>(
    first: Option<&'a String>,
    rest: impl Iterator<Item = &'a String>,
) -> String {
    let Some(first) = first else {
        return UNKNOWN_NAME.to_string();
    };
    std::iter::once(first)
        .chain(rest)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(s: &str) -> Vec<String> {
        s.split(' ').map(str::to_string).collect()
    }

    #[test]
    fn main_class_with_arguments() {
        let cmdline = args(
            "/usr/bin/java -Xmx1g -Dcatalina.base=/opt/tomcat -classpath /opt/tomcat/bin/bootstrap.jar org.apache.catalina.startup.Bootstrap start",
        );
        assert_eq!(
            display_name_from_cmdline(&cmdline),
            "org.apache.catalina.startup.Bootstrap start"
        );
    }

    #[test]
    fn jar_launch() {
        let cmdline = args("java -XX:+UseG1GC -jar app.jar --port 8080");
        assert_eq!(display_name_from_cmdline(&cmdline), "app.jar --port 8080");
    }

    #[test]
    fn module_options_consume_their_value() {
        let cmdline = args("java --add-opens java.base/java.lang=ALL-UNNAMED -cp x.jar com.example.Main");
        assert_eq!(display_name_from_cmdline(&cmdline), "com.example.Main");
    }

    #[test]
    fn no_main_class() {
        assert_eq!(display_name_from_cmdline(&args("java -version")), "Unknown");
        assert_eq!(display_name_from_cmdline(&args("java -jar")), "Unknown");
    }

    #[test]
    fn scans_perfdata_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let alice = tmp.path().join("hsperfdata_alice");
        let bob = tmp.path().join("hsperfdata_bob");
        std::fs::create_dir(&alice).unwrap();
        std::fs::create_dir(&bob).unwrap();
        std::fs::create_dir(tmp.path().join("other")).unwrap();
        std::fs::write(alice.join("4242"), b"").unwrap();
        std::fs::write(alice.join("not-a-pid"), b"").unwrap();
        std::fs::write(bob.join("17"), b"").unwrap();
        std::fs::write(tmp.path().join("other").join("99"), b"").unwrap();
        std::fs::write(tmp.path().join("hsperfdata_file"), b"").unwrap();

        let pids: Vec<u32> = perfdata_pids(tmp.path()).unwrap().into_iter().collect();
        assert_eq!(pids, vec![17, 4242]);
    }
}
