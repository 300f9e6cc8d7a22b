use anyhow::Result;
use pretty_assertions::assert_eq;

use crate::{CliTest, stderr, stdout};

const POST: &str = r#"const mongoose = require('mongoose');
const { statuses } = require('./constants');

const CommentSchema = new mongoose.Schema({
  body: String,
});

/** A blog post */
const PostSchema = new mongoose.Schema({
  // Shown in listings
  title: { type: String, required: true, trim: true },
  status: { type: String, enum: statuses, default: 'draft' },
  tags: [String],
  comments: [CommentSchema],
  views: { type: Number, min: 0, default: 0 },
});

PostSchema.index({ title: 'text' });

module.exports = mongoose.model('Post', PostSchema);
"#;

const CONSTANTS: &str = "module.exports = { statuses: ['draft', 'published'] };\n";

const EXPECTED: &str = concat!(
    "# Post\n",
    "- **title** `String` ``required`` ``trim``  \n",
    "Shown in listings\n",
    "- **status** `String` ``default: 'draft'`` ``'draft|published'``\n",
    "- **tags** `[String]`\n",
    "- **comments** `[Comment]`\n",
    "- **views** `Number` ``default: 0`` ``min: 0``\n",
    "\n",
    "**`Comment`** is a sub-document with fields:\n",
    "- **body** `String`\n",
    "\n",
    "## Indexes\n",
    "- `{ title: 'text' }`\n",
);

#[test]
fn test_render_file() -> Result<()> {
    let test = CliTest::with_file("models/Post.js", POST)?;
    test.write_file("models/constants.js", CONSTANTS)?;

    let output = test.command().arg("models/Post.js").output()?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), EXPECTED);
    assert_eq!(stderr(&output), "");
    Ok(())
}

#[test]
fn test_render_stdin_resolves_against_current_dir() -> Result<()> {
    let test = CliTest::with_file("constants.js", CONSTANTS)?;

    let mut cmd = test.command();
    cmd.arg("-");
    let output = test.run_with_stdin(cmd, POST)?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), EXPECTED);
    Ok(())
}

#[test]
fn test_output_is_deterministic() -> Result<()> {
    let test = CliTest::with_file("models/Post.js", POST)?;
    test.write_file("models/constants.js", CONSTANTS)?;

    let first = test.command().arg("models/Post.js").output()?;
    let second = test.command().arg("models/Post.js").output()?;

    assert_eq!(first.stdout, second.stdout);
    Ok(())
}

#[test]
fn test_verbose_reports_on_stderr_only() -> Result<()> {
    let test = CliTest::with_file(
        "Pet.js",
        "const PetSchema = new Schema({ kind: Species, name: String });\n",
    )?;

    let output = test.command().args(["-v", "Pet.js"]).output()?;

    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        "# Pet\n- **kind** `Species`\n- **name** `String`\n"
    );
    let stderr = stderr(&output);
    assert!(stderr.contains("info: no config file found"), "{}", stderr);
    assert!(stderr.contains("info: 1 module(s) indexed"), "{}", stderr);
    assert!(stderr.contains("warning:"), "{}", stderr);
    assert!(stderr.contains("Species"), "{}", stderr);
    Ok(())
}

#[test]
fn test_missing_module_is_fatal() -> Result<()> {
    let test = CliTest::with_file(
        "Post.js",
        "const { kinds } = require('./kinds');\nconst PostSchema = new Schema({ kind: { type: String, enum: kinds } });\n",
    )?;

    let output = test.command().arg("Post.js").output()?;

    assert_eq!(output.status.code(), Some(2));
    assert_eq!(stdout(&output), "");
    let stderr = stderr(&output);
    assert!(stderr.starts_with("error:"), "{}", stderr);
    assert!(stderr.contains("./kinds"), "{}", stderr);
    Ok(())
}

#[test]
fn test_no_schema_is_fatal() -> Result<()> {
    let test = CliTest::with_file("empty.js", "module.exports = {};\n")?;

    let output = test.command().arg("empty.js").output()?;

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("no schema declaration found"));
    Ok(())
}

#[test]
fn test_parse_error_is_fatal() -> Result<()> {
    let test = CliTest::with_file("broken.js", "const S = new Schema({ a: ;\n")?;

    let output = test.command().arg("broken.js").output()?;

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("failed to parse"));
    Ok(())
}

#[test]
fn test_unresolvable_type_warns_and_renders_object() -> Result<()> {
    let test = CliTest::with_file(
        "Order.js",
        "const OrderSchema = new Schema({ id: String, total: makeMoney() });\n",
    )?;

    let output = test.command().args(["-v", "Order.js"]).output()?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "# Order\n- **id** `String`\n- **total** `Object`\n"
    );
    let stderr = stderr(&output);
    assert!(
        stderr.contains("warning: field 'total': type is an unresolved value; documented as Object"),
        "{}",
        stderr
    );
    Ok(())
}
