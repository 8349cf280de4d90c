use crate::config::ensure_config_file;
use std::process::Command;

pub fn run() {
    let Some(path) = ensure_config_file() else {
        eprintln!("Could not create the config file");
        return;
    };

    println!("Opening {}", path.display());

    if let Ok(editor) = std::env::var("EDITOR") {
        match Command::new(&editor).arg(&path).status() {
            Ok(s) if s.success() => return,
            Ok(_) => eprintln!("Editor exited with error"),
            Err(e) => eprintln!("Failed to run {}: {}", editor, e),
        }
    }

    #[cfg(target_os = "macos")]
    {
        let _ = Command::new("open").arg("-t").arg(&path).status();
    }

    #[cfg(target_os = "linux")]
    {
        if Command::new("xdg-open").arg(&path).status().is_err() {
            for editor in &["nano", "vim", "vi"] {
                if Command::new(editor).arg(&path).status().is_ok() {
                    return;
                }
            }
        }
    }

    #[cfg(target_os = "windows")]
    {
        let _ = Command::new("notepad").arg(&path).status();
    }
}
