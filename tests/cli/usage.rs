use anyhow::Result;

use crate::{CliTest, stderr};

#[test]
fn test_no_input_prints_usage() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.command().output()?;

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert_eq!(stderr(&output), "Usage: mongoose-docgen [filePath]\n");
    Ok(())
}

#[test]
fn test_nonexistent_input_prints_usage() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.command().arg("nope.js").output()?;

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stderr(&output), "Usage: mongoose-docgen [filePath]\n");
    Ok(())
}

#[test]
fn test_directory_input_prints_usage() -> Result<()> {
    let test = CliTest::with_file("models/User.js", "const S = new Schema({});\n")?;

    let output = test.command().arg("models").output()?;

    assert_eq!(output.status.code(), Some(1));
    Ok(())
}

#[test]
fn test_hyphen_tokens_are_not_paths() -> Result<()> {
    let test = CliTest::with_file("User.js", "const UserSchema = new Schema({ a: String });\n")?;

    let output = test.command().args(["User.js", "--unknown"]).output()?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "# User\n- **a** `String`\n"
    );
    Ok(())
}

#[test]
fn test_hyphen_tokens_before_the_path_are_skipped() -> Result<()> {
    let test = CliTest::with_file("User.js", "const UserSchema = new Schema({ a: String });\n")?;

    for args in [["--unknown", "User.js"], ["-x", "User.js"]] {
        let output = test.command().args(args).output()?;

        assert!(output.status.success(), "{:?} stderr: {}", args, stderr(&output));
        assert_eq!(
            String::from_utf8_lossy(&output.stdout),
            "# User\n- **a** `String`\n"
        );
    }
    Ok(())
}

#[test]
fn test_help_lists_options() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.command().arg("--help").output()?;

    assert!(output.status.success());
    let help = String::from_utf8_lossy(&output.stdout);
    for option in ["--verbose", "--config", "--print-config"] {
        assert!(help.contains(option), "missing {} in {}", option, help);
    }
    Ok(())
}
