use std::io;
use std::path::Path;
use std::process::{Command, ExitStatus};

use log::debug;

/// Render a command template, substituting the `%(url)s` and `%(file)s`
/// placeholders. Placeholders the template does not use are left alone.
pub fn render(template: &str, url: Option<&str>, file: &Path) -> String {
    let mut rendered = template.replace("%(file)s", &file.to_string_lossy());
    if let Some(url) = url {
        rendered = rendered.replace("%(url)s", url);
    }
    rendered
}

/// Run a rendered command line through the shell, blocking until it
/// exits. The command's stdio is inherited so interactive downloaders
/// and players work unchanged.
pub fn run(command_line: &str) -> io::Result<ExitStatus> {
    debug!("running: {}", command_line);
    Command::new("sh").arg("-c").arg(command_line).status()
}
