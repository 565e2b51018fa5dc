use std::{
    ffi::OsStr,
    path::Path,
    process::{Command, Stdio},
};

use log::{debug, info};

use crate::{
    error::{MuseError, MuseResult},
    primitives::{Clef, Key, TimeSignature},
};

/// Fixed pieces of LilyPond syntax.
pub struct LilySyntax;
impl LilySyntax {
    pub const VERSION: &'static str = "2.18.2";
    pub const INDENT: &'static str = "    ";
    pub const TIE: &'static str = "~";
    pub const REST: &'static str = "r";

    pub fn header() -> String {
        format!("\\version \"{}\"\n{{", Self::VERSION)
    }
    pub fn footer() -> String {
        format!("{}\\bar \"|.\"\n}}", Self::INDENT)
    }
    /// Comment, that closes every k-th measure.
    pub fn measure_comment(measure_number: u32) -> String {
        format!("{}% Measure {}", Self::INDENT, measure_number)
    }
}

/// Score-wide settings, written before the first measure.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct RenderSettings {
    pub key: Key,
    pub clef: Clef,
    pub time_signature: TimeSignature,
}
impl RenderSettings {
    pub fn new(key: Key, clef: Clef, time_signature: TimeSignature) -> Self {
        Self {
            key,
            clef,
            time_signature,
        }
    }
}
impl RendersToLilypond for RenderSettings {
    fn render_lilypond(&self) -> String {
        [
            self.clef.render_lilypond(),
            self.key.render_lilypond(),
            self.time_signature.render_lilypond(),
        ]
        .iter()
        .map(|line| format!("{}{}\n", LilySyntax::INDENT, line))
        .collect()
    }
}

pub trait RendersToLilypond {
    fn render_lilypond(&self) -> String;
}

/// Compile written `.ly` file with `lilypond` executable.
///
/// Output files are placed next to the source, with the same stem.
pub fn run_lilypond(
    lilypond: impl AsRef<OsStr>,
    path: &Path,
) -> MuseResult<()> {
    let output_path = path.with_extension("");
    info!("running lilypond on {:?}", path);
    let output = Command::new(lilypond.as_ref())
        .stdin(Stdio::null())
        .arg(format!("--output={}", output_path.display()))
        .arg(path)
        .output()
        .map_err(|err| {
            MuseError::Lilypond(format!(
                "can not run {:?}: {}",
                lilypond.as_ref(),
                err
            ))
        })?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stdout.is_empty() {
        debug!("{stdout}");
    }
    if !output.status.success() {
        return Err(MuseError::Lilypond(format!(
            "{}: {}",
            output.status, stderr
        )));
    }
    if !stderr.is_empty() {
        debug!("{stderr}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn header_and_footer() {
        assert_eq!(LilySyntax::header(), "\\version \"2.18.2\"\n{");
        assert_eq!(LilySyntax::footer(), "    \\bar \"|.\"\n}");
        assert_eq!(LilySyntax::measure_comment(8), "    % Measure 8");
    }

    #[test]
    fn settings() {
        let settings = RenderSettings::new(
            "Am".parse().unwrap(),
            Clef::Bass,
            "3/4".parse().unwrap(),
        );
        assert_eq!(
            settings.render_lilypond(),
            "    \\clef bass\n    \\key a \\minor\n    \\time 3/4\n"
        );
    }

    #[test]
    fn missing_executable() {
        let result = run_lilypond(
            "surely-not-an-installed-lilypond",
            Path::new("score.ly"),
        );
        assert!(matches!(result, Err(MuseError::Lilypond(_))));
    }
}
