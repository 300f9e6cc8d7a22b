use anyhow::Result;
use pretty_assertions::assert_eq;
use serde_json::Value;

use crate::{CliTest, stderr, stdout};

const ORDER: &str = "const OrderSchema = new Schema({
  total: { kind: Number, required: true, min: 0 },
  note: { kind: String, trim: true },
});
";

#[test]
fn test_print_config() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.command().arg("--print-config").output()?;

    assert!(output.status.success());
    let parsed: Value = serde_json::from_str(&stdout(&output))?;
    assert_eq!(parsed["typeMarker"], "type");
    assert_eq!(parsed["schemaConstructors"][0], "Schema");
    assert_eq!(parsed["options"][0], "ref");
    Ok(())
}

#[test]
fn test_discovered_config_applies() -> Result<()> {
    let test = CliTest::with_file("models/Order.js", ORDER)?;
    test.write_file(
        ".docgenrc.json",
        r#"{ "typeMarker": "kind", "options": ["min", "required"] }"#,
    )?;

    let output = test.command().arg("models/Order.js").output()?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "# Order\n- **total** `Number` ``min: 0`` ``required``\n- **note** `String`\n"
    );
    Ok(())
}

#[test]
fn test_explicit_config_path() -> Result<()> {
    let test = CliTest::with_file("Order.js", ORDER)?;
    test.write_file("conf/docgen.json", r#"{ "typeMarker": "kind" }"#)?;

    let output = test
        .command()
        .args(["--config", "conf/docgen.json", "Order.js"])
        .output()?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "# Order\n- **total** `Number` ``required`` ``min: 0``\n- **note** `String` ``trim``\n"
    );
    Ok(())
}

#[test]
fn test_invalid_config_is_fatal() -> Result<()> {
    let test = CliTest::with_file("Order.js", ORDER)?;
    test.write_file(".docgenrc.json", r#"{ "typeMarker": "not a name" }"#)?;

    let output = test.command().arg("Order.js").output()?;

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("typeMarker"), "{}", stderr(&output));
    assert!(test.root().join(".docgenrc.json").exists());
    Ok(())
}
