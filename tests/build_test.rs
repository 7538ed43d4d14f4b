#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use diagram_tag::build;

fn fake_tool(dir: &Path) -> String {
    let path = dir.join("fake-tool");
    let script = r#"#!/bin/sh
out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "-o" ]; then out="$2"; shift; fi
  shift
done
cat > "$out.stdin"
printf 'PNG' > "$out"
"#;
    fs::write(&path, script).expect("write script");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod script");
    path.to_string_lossy().into_owned()
}

fn write_site(dir: &Path, tool: &str, on_failure: &str) {
    fs::write(
        dir.join("site.yaml"),
        format!(
            r#"meta:
  name: Test site
diagram:
  command: {}
  on_failure: {}
output: _site
pages:
  - template: index.hbs
    output: index.html
    data: index.yaml
"#,
            tool, on_failure
        ),
    )
    .expect("write site.yaml");
    fs::write(
        dir.join("index.hbs"),
        "<h1>{{title}}</h1>\n{{#diagram wire1}}A -> B{{/diagram}}\n",
    )
    .expect("write template");
    fs::write(dir.join("index.yaml"), "title: Wires\n").expect("write data");
}

#[test]
fn build_renders_page_and_copies_diagram() {
    let dir = tempfile::tempdir().expect("tempdir");
    let tool = fake_tool(dir.path());
    write_site(dir.path(), &tool, "warn");

    build::execute_build(
        dir.path().join("site.yaml").to_string_lossy().into_owned(),
        false,
    )
    .expect("build to succeed");

    let html = fs::read_to_string(dir.path().join("_site/index.html")).expect("output html");
    assert!(html.contains("<h1>Wires</h1>"));
    assert!(html.contains("<img src='/wire1.png' width='75%'>"));

    // the tool wrote the PNG at the source root and the copy phase moved it
    assert!(dir.path().join("wire1.png").exists());
    assert!(dir.path().join("_site/wire1.png").exists());

    let captured = fs::read_to_string(dir.path().join("wire1.png.stdin")).expect("capture");
    assert_eq!(captured, "A -> B");
}

#[test]
fn failed_tool_in_warn_mode_still_produces_the_page() {
    let dir = tempfile::tempdir().expect("tempdir");
    let tool_path = dir.path().join("fake-tool");
    fs::write(&tool_path, "#!/bin/sh\necho 'no such gate' >&2\nexit 2\n").expect("write script");
    fs::set_permissions(&tool_path, fs::Permissions::from_mode(0o755)).expect("chmod script");
    write_site(dir.path(), &tool_path.to_string_lossy(), "warn");

    build::execute_build(
        dir.path().join("site.yaml").to_string_lossy().into_owned(),
        false,
    )
    .expect("build to succeed");

    // broken image link behavior: the tag is emitted, the asset is absent
    let html = fs::read_to_string(dir.path().join("_site/index.html")).expect("output html");
    assert!(html.contains("<img src='/wire1.png' width='75%'>"));
    assert!(!dir.path().join("_site/wire1.png").exists());
}

#[test]
fn failed_tool_in_error_mode_fails_the_build() {
    let dir = tempfile::tempdir().expect("tempdir");
    let tool_path = dir.path().join("fake-tool");
    fs::write(&tool_path, "#!/bin/sh\necho 'no such gate' >&2\nexit 2\n").expect("write script");
    fs::set_permissions(&tool_path, fs::Permissions::from_mode(0o755)).expect("chmod script");
    write_site(dir.path(), &tool_path.to_string_lossy(), "error");

    let res = build::execute_build(
        dir.path().join("site.yaml").to_string_lossy().into_owned(),
        false,
    );

    assert!(res.is_err());
}
