use fsaudit::{
    AuditBuilder, AuditError, AuditStream, Classifier, IdentityResolver, Reporter, audit,
    audit_to_string,
};
use std::fs;
use std::path::Path;
use tempfile::{TempDir, tempdir};
fn identity_fixture() -> TempDir {
    let ids = tempdir().unwrap();
    fs::write(ids.path().join("passwd"), "").unwrap();
    fs::write(ids.path().join("group"), "").unwrap();
    ids
}
fn builder(roots: &[&Path], ids: &TempDir) -> AuditBuilder {
    AuditBuilder::new(roots.iter().copied())
        .passwd_path(ids.path().join("passwd"))
        .group_path(ids.path().join("group"))
}
fn line_for<'a>(output: &'a str, path: &Path) -> &'a str {
    let path = path.display().to_string();
    output
        .lines()
        .find(|line| line.ends_with(&path) || line.contains(&format!("{} md5=", path)))
        .unwrap_or_else(|| panic!("no line for {} in:\n{}", path, output))
}
#[test]
fn integration_text_and_binary() {
    let dir = tempdir().unwrap();
    let ids = identity_fixture();
    fs::write(dir.path().join("a.txt"), "hello").unwrap();
    let mut elf = b"\x7fELF\x02\x01\x01\0".to_vec();
    elf.resize(1024, 0);
    fs::write(dir.path().join("b.bin"), elf).unwrap();
    let output = audit_to_string(builder(&[dir.path()], &ids).build()).unwrap();
    assert_eq!(output.lines().count(), 3);
    let first = output.lines().next().unwrap();
    assert!(first.starts_with('d'));
    assert!(first.ends_with(&dir.path().display().to_string()));
    let text = line_for(&output, &dir.path().join("a.txt"));
    assert!(text.ends_with("a.txt md5=5d41402abc4b2a76b9719d911017c592"));
    let binary = line_for(&output, &dir.path().join("b.bin"));
    assert!(binary.starts_with('-'));
    assert!(!binary.contains("md5="));
    assert!(binary.contains(" 1024 "));
}
#[test]
fn integration_nested_directories() {
    let dir = tempdir().unwrap();
    let ids = identity_fixture();
    fs::create_dir_all(dir.path().join("etc/conf.d")).unwrap();
    fs::write(dir.path().join("etc/conf.d/app.conf"), "port = 80\n").unwrap();
    fs::write(dir.path().join(".hidden"), "dotfile").unwrap();
    fs::write(dir.path().join(".gitignore"), "etc\n").unwrap();
    let output = audit_to_string(builder(&[dir.path()], &ids).build()).unwrap();
    // root, etc, conf.d, app.conf, .hidden, .gitignore
    assert_eq!(output.lines().count(), 6);
    let conf_d = line_for(&output, &dir.path().join("etc/conf.d"));
    assert!(conf_d.starts_with('d'));
    assert!(!conf_d.contains("md5="));
    assert!(line_for(&output, &dir.path().join("etc/conf.d/app.conf")).contains("md5="));
    assert!(line_for(&output, &dir.path().join(".hidden")).contains("md5="));
}
#[test]
fn integration_missing_root_is_skipped() {
    let dir = tempdir().unwrap();
    let ids = identity_fixture();
    fs::write(dir.path().join("a.txt"), "hello").unwrap();
    let missing = dir.path().join("does-not-exist");
    let mut out = Vec::new();
    let summary = audit(
        builder(&[missing.as_path(), dir.path()], &ids).build(),
        &mut out,
    )
    .unwrap();
    let output = String::from_utf8(out).unwrap();
    assert_eq!(output.lines().count(), 2);
    assert!(!output.contains("does-not-exist"));
    assert_eq!(summary.roots, 1);
    assert_eq!(summary.walk_errors, 1);
    assert_eq!(summary.entries, 2);
    assert_eq!(summary.checksummed, 1);
}
#[test]
fn integration_roots_in_argument_order() {
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    let ids = identity_fixture();
    fs::write(first.path().join("one.txt"), "1").unwrap();
    fs::write(second.path().join("two.txt"), "2").unwrap();
    let output =
        audit_to_string(builder(&[second.path(), first.path()], &ids).build()).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].ends_with(&second.path().display().to_string()));
    assert!(lines[1].contains("two.txt md5="));
    assert!(lines[2].ends_with(&first.path().display().to_string()));
    assert!(lines[3].contains("one.txt md5="));
}
#[test]
fn integration_idempotent() {
    let dir = tempdir().unwrap();
    let ids = identity_fixture();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("sub/x.txt"), "x").unwrap();
    fs::write(dir.path().join("y.txt"), "y").unwrap();
    let first = audit_to_string(builder(&[dir.path()], &ids).build()).unwrap();
    let second = audit_to_string(builder(&[dir.path()], &ids).build()).unwrap();
    assert_eq!(first, second);
}
#[test]
fn integration_sorted_entries() {
    let dir = tempdir().unwrap();
    let ids = identity_fixture();
    for name in ["c.txt", "a.txt", "b.txt"] {
        fs::write(dir.path().join(name), name).unwrap();
    }
    let output =
        audit_to_string(builder(&[dir.path()], &ids).sort_entries(true).build()).unwrap();
    let names: Vec<&str> = output
        .lines()
        .skip(1)
        .map(|line| line.split(" md5=").next().unwrap())
        .map(|prefix| prefix.rsplit('/').next().unwrap())
        .collect();
    assert_eq!(names, ["a.txt", "b.txt", "c.txt"]);
}
#[test]
fn integration_stream_summary() {
    let dir = tempdir().unwrap();
    let ids = identity_fixture();
    fs::write(dir.path().join("a.txt"), "hello").unwrap();
    fs::write(dir.path().join("blob"), [0u8, 1, 2, 3, 0, 0]).unwrap();
    let mut stream = AuditStream::new(builder(&[dir.path()], &ids).build()).unwrap();
    let reports: Vec<_> = stream.by_ref().collect();
    assert_eq!(reports.len(), 3);
    let summary = stream.summary();
    assert_eq!(summary.entries, 3);
    assert_eq!(summary.checksummed, 1);
    assert_eq!(summary.binary, 1);
    assert_eq!(summary.skipped, 0);
}
#[test]
fn integration_bad_signature_file_is_fatal() {
    let dir = tempdir().unwrap();
    let ids = identity_fixture();
    let sigs = dir.path().join("signatures");
    fs::write(&sigs, "not a signature\n").unwrap();
    let mut out = Vec::new();
    let err = audit(
        builder(&[dir.path()], &ids)
            .signature_file(Some(sigs))
            .build(),
        &mut out,
    )
    .unwrap_err();
    assert!(matches!(err, AuditError::FatalInit { .. }));
    assert!(err.is_fatal());
    assert!(out.is_empty());
}
#[test]
fn integration_custom_signature_marks_binary() {
    let dir = tempdir().unwrap();
    let ids = identity_fixture();
    let sigs = dir.path().join("signatures");
    fs::write(&sigs, "0:464f524d:application/octet-stream\n").unwrap();
    fs::write(dir.path().join("payload.iff"), "FORM text-looking container").unwrap();
    let output = audit_to_string(
        builder(&[dir.path()], &ids)
            .signature_file(Some(sigs))
            .build(),
    )
    .unwrap();
    assert!(!line_for(&output, &dir.path().join("payload.iff")).contains("md5="));
    assert!(line_for(&output, &dir.path().join("signatures")).contains("md5="));
}
#[cfg(unix)]
#[test]
fn integration_symlinked_directory_not_descended() {
    let dir = tempdir().unwrap();
    let other = tempdir().unwrap();
    let ids = identity_fixture();
    fs::write(other.path().join("inner.txt"), "inner").unwrap();
    std::os::unix::fs::symlink(other.path(), dir.path().join("link")).unwrap();
    let output = audit_to_string(builder(&[dir.path()], &ids).build()).unwrap();
    assert_eq!(output.lines().count(), 2);
    assert!(line_for(&output, &dir.path().join("link")).starts_with('d'));
    assert!(!output.contains("inner.txt"));
}
#[cfg(unix)]
#[test]
fn integration_symlinked_root_not_descended() {
    let dir = tempdir().unwrap();
    let other = tempdir().unwrap();
    let ids = identity_fixture();
    fs::write(other.path().join("inner.txt"), "inner").unwrap();
    let link = dir.path().join("link");
    std::os::unix::fs::symlink(other.path(), &link).unwrap();
    let output = audit_to_string(builder(&[link.as_path()], &ids).build()).unwrap();
    assert_eq!(output.lines().count(), 1);
    assert!(output.starts_with('d'));
    assert!(output.trim_end().ends_with(&link.display().to_string()));
    let followed =
        audit_to_string(builder(&[link.as_path()], &ids).follow_links(true).build()).unwrap();
    assert_eq!(followed.lines().count(), 2);
    assert!(followed.contains("inner.txt md5="));
}
#[cfg(unix)]
#[test]
fn integration_unreadable_subdir_continues() {
    use std::os::unix::fs::PermissionsExt;
    let dir = tempdir().unwrap();
    let ids = identity_fixture();
    let locked = dir.path().join("locked");
    fs::create_dir_all(dir.path().join("open")).unwrap();
    fs::create_dir(&locked).unwrap();
    fs::write(locked.join("inside.txt"), "inside").unwrap();
    fs::write(dir.path().join("open/sibling.txt"), "sibling").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
    if fs::read_dir(&locked).is_ok() {
        // running with CAP_DAC_OVERRIDE, permissions are not enforced
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }
    let mut out = Vec::new();
    let summary = audit(builder(&[dir.path()], &ids).build(), &mut out).unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
    let output = String::from_utf8(out).unwrap();
    assert!(line_for(&output, &locked).starts_with("d---------"));
    assert!(!output.contains("inside.txt"));
    assert!(line_for(&output, &dir.path().join("open/sibling.txt")).contains("md5="));
    assert_eq!(summary.walk_errors, 1);
    assert_eq!(summary.entries, 4);
}
#[cfg(target_os = "linux")]
#[test]
fn integration_non_utf8_path_written_raw() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;
    let dir = tempdir().unwrap();
    let ids = identity_fixture();
    fs::write(dir.path().join(OsStr::from_bytes(b"caf\xe9.txt")), "x").unwrap();
    fs::write(dir.path().join(OsStr::from_bytes(b"caf\xe8.txt")), "x").unwrap();
    let mut out = Vec::new();
    audit(builder(&[dir.path()], &ids).build(), &mut out).unwrap();
    let contains = |needle: &[u8]| out.windows(needle.len()).any(|w| w == needle);
    assert!(contains(&b"/caf\xe9.txt md5="[..]));
    assert!(contains(&b"/caf\xe8.txt md5="[..]));
}
#[cfg(unix)]
#[test]
fn integration_stream_with_injected_reporter() {
    use std::os::unix::fs::MetadataExt;
    let dir = tempdir().unwrap();
    let ids = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "hello").unwrap();
    let meta = fs::metadata(dir.path()).unwrap();
    fs::write(ids.path().join("users"), format!("snap:x:{}:\n", meta.uid())).unwrap();
    fs::write(ids.path().join("groups"), format!("snaps:x:{}:\n", meta.gid())).unwrap();
    let reporter = Reporter::new(
        IdentityResolver::new(ids.path().join("users"), ids.path().join("groups")),
        Classifier::new(None).unwrap(),
    );
    let options = AuditBuilder::new([dir.path()]).build();
    let reports: Vec<_> = AuditStream::with_reporter(options, reporter).collect();
    assert_eq!(reports.len(), 2);
    for report in &reports {
        assert_eq!(report.owner, "snap");
        assert_eq!(report.group, "snaps");
    }
}
