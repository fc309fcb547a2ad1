//! Side-effecting commands: launch a program, open a URL, start a web search.
//!
//! Each action makes a single attempt and always returns a user-facing
//! message. Failures are logged and folded into that message.

use shared::{AssistantError, Command};
use std::io;
use std::process::{Child, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::sync::Arc;

const BROWSER_HOME: &str = "https://www.google.de";

/// What an alias resolves to on the current platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchTarget {
    Program {
        program: &'static str,
        args: &'static [&'static str],
    },
    /// Opened with the default handler (URL or path)
    Open(&'static str),
    /// The user's home folder in the file manager
    HomeFolder,
}

/// Seam to the operating system
pub trait Launcher: Send + Sync {
    /// Open a URL or path with the default handler
    fn open(&self, target: &str) -> io::Result<()>;

    /// Start a program without waiting for it
    fn spawn(&self, program: &str, args: &[&str]) -> io::Result<()>;
}

/// Launcher backed by the real desktop
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn open(&self, target: &str) -> io::Result<()> {
        open::that(target)
    }

    fn spawn(&self, program: &str, args: &[&str]) -> io::Result<()> {
        let child = std::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        reap_in_background(child);
        Ok(())
    }
}

/// Wait for a launched program on a helper thread so it is reaped when it
/// exits instead of lingering until the assistant quits.
fn reap_in_background(mut child: Child) -> JoinHandle<io::Result<ExitStatus>> {
    let pid = child.id();
    std::thread::spawn(move || {
        let status = child.wait();
        tracing::debug!(pid, ?status, "launched program exited");
        status
    })
}

#[cfg(target_os = "windows")]
fn platform_alias(name: &str) -> Option<LaunchTarget> {
    let target = match name {
        "notepad" | "editor" => LaunchTarget::Program {
            program: "notepad.exe",
            args: &[],
        },
        "calculator" | "rechner" | "taschenrechner" => LaunchTarget::Program {
            program: "calc.exe",
            args: &[],
        },
        "explorer" => LaunchTarget::Program {
            program: "explorer.exe",
            args: &[],
        },
        "browser" => LaunchTarget::Open(BROWSER_HOME),
        _ => return None,
    };
    Some(target)
}

#[cfg(target_os = "macos")]
fn platform_alias(name: &str) -> Option<LaunchTarget> {
    let target = match name {
        "notepad" | "editor" => LaunchTarget::Program {
            program: "open",
            args: &["-a", "TextEdit"],
        },
        "calculator" | "rechner" | "taschenrechner" => LaunchTarget::Program {
            program: "open",
            args: &["-a", "Calculator"],
        },
        "explorer" => LaunchTarget::HomeFolder,
        "browser" => LaunchTarget::Open(BROWSER_HOME),
        _ => return None,
    };
    Some(target)
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn platform_alias(name: &str) -> Option<LaunchTarget> {
    let target = match name {
        "notepad" | "editor" => LaunchTarget::Program {
            program: "gedit",
            args: &[],
        },
        "calculator" | "rechner" | "taschenrechner" => LaunchTarget::Program {
            program: "gnome-calculator",
            args: &[],
        },
        "explorer" => LaunchTarget::HomeFolder,
        "browser" => LaunchTarget::Open(BROWSER_HOME),
        _ => return None,
    };
    Some(target)
}

/// Look up a program alias (`notepad`, `rechner`, `browser`, ...)
pub fn resolve_alias(name: &str) -> Option<LaunchTarget> {
    platform_alias(name.trim().to_lowercase().as_str())
}

/// Add `https://` unless the URL already names http(s)
pub fn normalize_url(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

/// Search URL with each word percent-encoded and words joined by `+`
pub fn build_search_url(base: &str, query: &str) -> String {
    let encoded: Vec<String> = query
        .split(' ')
        .map(|word| urlencoding::encode(word).into_owned())
        .collect();
    format!("{}{}", base, encoded.join("+"))
}

pub struct ActionRunner {
    launcher: Arc<dyn Launcher>,
    search_url: String,
}

impl ActionRunner {
    pub fn new(launcher: Arc<dyn Launcher>, search_url: impl Into<String>) -> Self {
        Self {
            launcher,
            search_url: search_url.into(),
        }
    }

    /// Run a side-effecting command. Returns `None` for commands the host
    /// handles itself (help, clear, exit).
    pub fn run(&self, command: &Command) -> Option<String> {
        match command {
            Command::OpenProgram(name) => Some(self.open_program(name)),
            Command::OpenUrl(url) => Some(self.open_url(url)),
            Command::Search(query) => Some(self.web_search(query)),
            Command::Help | Command::ClearChat | Command::Exit => None,
        }
    }

    pub fn open_program(&self, name: &str) -> String {
        if name.is_empty() {
            return "Bitte gib ein Programm an, das ich öffnen soll.".to_string();
        }

        match resolve_alias(name) {
            Some(target) => match self.launch(target) {
                Ok(()) => format!("Das Programm '{}' wird geöffnet.", name),
                Err(e) => {
                    let err = AssistantError::action(name, e);
                    tracing::error!("error opening program {}: {}", name, err);
                    format!(
                        "Es gab einen Fehler beim Öffnen von '{}': {}",
                        name,
                        err.detail()
                    )
                }
            },
            None => match self.launcher.spawn(name, &[]) {
                Ok(()) => format!("Versuche, '{}' zu öffnen.", name),
                Err(e) => {
                    tracing::warn!("{}", AssistantError::action(name, e));
                    format!(
                        "Entschuldigung, ich konnte '{}' nicht öffnen. Ist es auf deinem System installiert?",
                        name
                    )
                }
            },
        }
    }

    fn launch(&self, target: LaunchTarget) -> io::Result<()> {
        match target {
            LaunchTarget::Program { program, args } => self.launcher.spawn(program, args),
            LaunchTarget::Open(url) => self.launcher.open(url),
            LaunchTarget::HomeFolder => {
                let home = dirs::home_dir().ok_or_else(|| {
                    io::Error::new(io::ErrorKind::NotFound, "no home directory")
                })?;
                self.launcher.open(&home.to_string_lossy())
            }
        }
    }

    pub fn open_url(&self, url: &str) -> String {
        if url.is_empty() {
            return "Bitte gib eine URL an, die ich öffnen soll.".to_string();
        }

        let url = normalize_url(url);
        match self.launcher.open(&url) {
            Ok(()) => format!("Die URL '{}' wurde im Browser geöffnet.", url),
            Err(e) => {
                let err = AssistantError::action(url.as_str(), e);
                tracing::error!("error opening URL {}: {}", url, err);
                format!(
                    "Es gab einen Fehler beim Öffnen der URL '{}': {}",
                    url,
                    err.detail()
                )
            }
        }
    }

    pub fn web_search(&self, query: &str) -> String {
        if query.is_empty() {
            return "Bitte gib einen Suchbegriff an.".to_string();
        }

        let search_url = build_search_url(&self.search_url, query);
        match self.launcher.open(&search_url) {
            Ok(()) => format!("Ich habe eine Suche nach '{}' gestartet.", query),
            Err(e) => {
                let err = AssistantError::action(search_url.as_str(), e);
                tracing::error!("error performing search for {}: {}", query, err);
                format!(
                    "Es gab einen Fehler bei der Suche nach '{}': {}",
                    query,
                    err.detail()
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    const SEARCH: &str = "https://www.google.com/search?q=";

    #[derive(Default)]
    struct RecordingLauncher {
        calls: Mutex<Vec<String>>,
        fail: bool,
    }

    impl RecordingLauncher {
        fn failing() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        fn result(&self) -> io::Result<()> {
            if self.fail {
                Err(io::Error::new(io::ErrorKind::NotFound, "not found"))
            } else {
                Ok(())
            }
        }
    }

    impl Launcher for RecordingLauncher {
        fn open(&self, target: &str) -> io::Result<()> {
            self.calls.lock().push(format!("open {}", target));
            self.result()
        }

        fn spawn(&self, program: &str, args: &[&str]) -> io::Result<()> {
            self.calls
                .lock()
                .push(format!("spawn {} {}", program, args.join(" ")).trim().to_string());
            self.result()
        }
    }

    fn runner(launcher: &Arc<RecordingLauncher>) -> ActionRunner {
        ActionRunner::new(launcher.clone(), SEARCH)
    }

    #[test]
    fn test_empty_url_prompts_without_opening() {
        let launcher = Arc::new(RecordingLauncher::default());
        assert_eq!(
            runner(&launcher).open_url(""),
            "Bitte gib eine URL an, die ich öffnen soll."
        );
        assert!(launcher.calls.lock().is_empty());
    }

    #[test]
    fn test_empty_search_prompts_without_opening() {
        let launcher = Arc::new(RecordingLauncher::default());
        assert_eq!(runner(&launcher).web_search(""), "Bitte gib einen Suchbegriff an.");
        assert!(launcher.calls.lock().is_empty());
    }

    #[test]
    fn test_url_gets_https_scheme() {
        let launcher = Arc::new(RecordingLauncher::default());
        let msg = runner(&launcher).open_url("example.com");
        assert_eq!(msg, "Die URL 'https://example.com' wurde im Browser geöffnet.");
        assert_eq!(*launcher.calls.lock(), vec!["open https://example.com"]);
    }

    #[test]
    fn test_url_keeps_existing_scheme() {
        assert_eq!(normalize_url("http://localhost:8080"), "http://localhost:8080");
        assert_eq!(normalize_url("https://rust-lang.org"), "https://rust-lang.org");
    }

    #[test]
    fn test_search_url_encoding() {
        assert_eq!(
            build_search_url(SEARCH, "rust async traits"),
            "https://www.google.com/search?q=rust+async+traits"
        );
        assert_eq!(
            build_search_url(SEARCH, "grüße & co"),
            "https://www.google.com/search?q=gr%C3%BC%C3%9Fe+%26+co"
        );
    }

    #[test]
    fn test_search_opens_browser() {
        let launcher = Arc::new(RecordingLauncher::default());
        let msg = runner(&launcher).web_search("katzenbilder");
        assert_eq!(msg, "Ich habe eine Suche nach 'katzenbilder' gestartet.");
        assert_eq!(
            *launcher.calls.lock(),
            vec!["open https://www.google.com/search?q=katzenbilder"]
        );
    }

    #[test]
    fn test_known_program_alias() {
        let launcher = Arc::new(RecordingLauncher::default());
        let msg = runner(&launcher).open_program("rechner");
        assert_eq!(msg, "Das Programm 'rechner' wird geöffnet.");
        assert_eq!(launcher.calls.lock().len(), 1);
        assert_eq!(resolve_alias("taschenrechner"), resolve_alias("calculator"));
        assert_eq!(resolve_alias("browser"), Some(LaunchTarget::Open(BROWSER_HOME)));
    }

    #[test]
    fn test_unknown_program_is_tried_directly() {
        let launcher = Arc::new(RecordingLauncher::default());
        let msg = runner(&launcher).open_program("vlc");
        assert_eq!(msg, "Versuche, 'vlc' zu öffnen.");
        assert_eq!(*launcher.calls.lock(), vec!["spawn vlc"]);
    }

    #[test]
    fn test_unknown_program_failure_message() {
        let launcher = Arc::new(RecordingLauncher::failing());
        assert_eq!(
            runner(&launcher).open_program("gibtsnicht"),
            "Entschuldigung, ich konnte 'gibtsnicht' nicht öffnen. Ist es auf deinem System installiert?"
        );
    }

    #[test]
    fn test_known_program_failure_message() {
        let launcher = Arc::new(RecordingLauncher::failing());
        assert_eq!(
            runner(&launcher).open_program("browser"),
            "Es gab einen Fehler beim Öffnen von 'browser': not found"
        );
    }

    #[test]
    fn test_url_failure_message() {
        let launcher = Arc::new(RecordingLauncher::failing());
        assert_eq!(
            runner(&launcher).open_url("example.com"),
            "Es gab einen Fehler beim Öffnen der URL 'https://example.com': not found"
        );
    }

    #[test]
    fn test_run_dispatches_only_actions() {
        let launcher = Arc::new(RecordingLauncher::default());
        let runner = runner(&launcher);
        assert!(runner.run(&Command::Help).is_none());
        assert!(runner.run(&Command::Exit).is_none());
        assert_eq!(
            runner.run(&Command::Search(String::new())).as_deref(),
            Some("Bitte gib einen Suchbegriff an.")
        );
    }

    #[test]
    fn test_empty_program_name() {
        let launcher = Arc::new(RecordingLauncher::default());
        assert_eq!(
            runner(&launcher).open_program(""),
            "Bitte gib ein Programm an, das ich öffnen soll."
        );
        assert!(launcher.calls.lock().is_empty());
    }

    #[test]
    fn test_missing_program_fails_to_spawn() {
        assert!(SystemLauncher
            .spawn("ki-assistant-no-such-program", &[])
            .is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_launched_program_is_reaped() {
        let child = std::process::Command::new("sh")
            .args(["-c", "exit 3"])
            .spawn()
            .unwrap();
        let status = reap_in_background(child).join().unwrap().unwrap();
        assert_eq!(status.code(), Some(3));
    }
}
