use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use dialoguer::Confirm;

use crate::domain::{AppError, Session};

/// Fixed filename for the code artifact alone.
pub const CODE_FILE: &str = "fixed_code.py";

/// Fixed filename for the FullCode concatenation.
pub const FULL_CODE_FILE: &str = "full_code.py";

/// Paths written by a successful export.
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub code_path: PathBuf,
    pub full_code_path: PathBuf,
}

/// Ask the user to confirm the artifacts before export.
///
/// `assume_yes` confirms without prompting; otherwise a terminal is
/// required for the interactive prompt.
pub fn confirm(session: &mut Session, assume_yes: bool) -> Result<bool, AppError> {
    if assume_yes {
        session.confirmed = true;
        return Ok(true);
    }

    if !std::io::stdin().is_terminal() {
        return Err(AppError::Confirm(
            "stdin is not a terminal; pass --yes to export non-interactively".into(),
        ));
    }

    let confirmed = Confirm::new()
        .with_prompt("Confirm the code and export it?")
        .default(true)
        .interact()
        .map_err(|e| AppError::Confirm(e.to_string()))?;

    session.confirmed = confirmed;
    Ok(confirmed)
}

/// Execute the export: write both artifacts as plain text files with
/// fixed names. Requires a confirmed session.
pub fn execute(session: &Session, out_dir: &Path) -> Result<ExportOutcome, AppError> {
    if !session.confirmed {
        return Err(AppError::config_error("Artifacts were not confirmed for export"));
    }

    fs::create_dir_all(out_dir)?;

    let code_path = out_dir.join(CODE_FILE);
    let full_code_path = out_dir.join(FULL_CODE_FILE);
    fs::write(&code_path, session.code())?;
    fs::write(&full_code_path, session.full_code())?;

    Ok(ExportOutcome { code_path, full_code_path })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn confirmed_session() -> Session {
        let mut session = Session::new("task");
        session.set_artifacts("def f():\n    return 1".into(), "assert f() == 1".into());
        session.confirmed = true;
        session
    }

    #[test]
    fn writes_both_artifacts_with_fixed_names() {
        let dir = tempfile::tempdir().unwrap();
        let session = confirmed_session();

        let outcome = execute(&session, dir.path()).unwrap();
        assert_eq!(outcome.code_path.file_name().unwrap(), CODE_FILE);
        assert_eq!(outcome.full_code_path.file_name().unwrap(), FULL_CODE_FILE);

        let code = fs::read_to_string(&outcome.code_path).unwrap();
        let full = fs::read_to_string(&outcome.full_code_path).unwrap();
        assert_eq!(code, session.code());
        assert_eq!(full, format!("{}\n\n{}", session.code(), session.tests()));
    }

    #[test]
    fn refuses_to_export_unconfirmed_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = confirmed_session();
        session.confirmed = false;

        assert!(matches!(execute(&session, dir.path()), Err(AppError::Configuration(_))));
    }

    #[test]
    fn creates_the_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("artifacts").join("latest");

        execute(&confirmed_session(), &nested).unwrap();
        assert!(nested.join(CODE_FILE).is_file());
    }

    #[test]
    fn assume_yes_confirms_without_a_terminal() {
        let mut session = confirmed_session();
        session.confirmed = false;
        assert!(confirm(&mut session, true).unwrap());
        assert!(session.confirmed);
    }
}
