use assert_cmd::Command;
use assert_cmd::cargo;
use mockito::Server;
use predicates::prelude::*;
use tempfile::tempdir;

fn portal_page(base_url: &str) -> String {
    format!(
        r##"
        <html><body>
        <select class="version">
            <option value="0">V8.10g</option>
            <option value="1">V7.96</option>
        </select>
        <div class="links v0">
            <p class="os-name">Linux</p>
            <div class="linkbox-link">
                <a href="#"><img src="icon.png"/></a>
                <a href="{base}/JLink_Linux_x86_64.tgz">J-Link Software, Linux, TGZ archive, 64-bit</a>
            </div>
            <div class="linkbox-link">
                <a href="#"><img src="icon.png"/></a>
                <a href="{base}/JLink_Linux_i386.tgz">J-Link Software, Linux, TGZ archive, 32-bit</a>
            </div>
            <p class="os-name">Windows</p>
            <div class="linkbox-link">
                <a href="#"><img src="icon.png"/></a>
                <a href="{base}/JLink_Windows_x86_64.exe">J-Link Software, Windows, 64-bit installer</a>
            </div>
        </div>
        </body></html>
        "##,
        base = base_url
    )
}

#[test]
fn test_check_reports_latest_version() {
    let mut server = Server::new();
    let url = server.url();

    let _mock_page = server
        .mock("GET", "/")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(portal_page(&url))
        .create();

    let mut cmd = Command::new(cargo::cargo_bin!("jlink-update"));
    cmd.arg("check").arg("--portal-url").arg(&url);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Latest Version: V8.10g"))
        .stdout(predicate::str::contains("Installed version:"));
}

#[test]
fn test_check_json_report() {
    let mut server = Server::new();
    let url = server.url();

    let _mock_page = server
        .mock("GET", "/")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(portal_page(&url))
        .create();

    let mut cmd = Command::new(cargo::cargo_bin!("jlink-update"));
    cmd.arg("check").arg("--json").arg("--portal-url").arg(&url);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(r#""latest": "V8.10g""#))
        .stdout(predicate::str::contains(r#""update_available""#));
}

#[test]
fn test_check_fails_when_portal_unreachable() {
    let mut server = Server::new();
    let url = server.url();

    let _mock_page = server.mock("GET", "/").with_status(404).create();

    let mut cmd = Command::new(cargo::cargo_bin!("jlink-update"));
    cmd.arg("check").arg("--portal-url").arg(&url);

    cmd.assert().failure();
}

#[test]
fn test_end_to_end_download() {
    let mut server = Server::new();
    let url = server.url();

    let _mock_page = server
        .mock("GET", "/")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(portal_page(&url))
        .create();

    let _mock_package = server
        .mock("POST", "/JLink_Linux_x86_64.tgz")
        .match_body(mockito::Matcher::UrlEncoded(
            "accept_license_agreement".into(),
            "accepted".into(),
        ))
        .with_status(200)
        .with_header("content-type", "application/octet-stream")
        .with_body("tarball bytes")
        .create();

    let download_dir = tempdir().unwrap();

    let mut cmd = Command::new(cargo::cargo_bin!("jlink-update"));
    cmd.arg("download")
        .arg("--system")
        .arg("linux")
        .arg("--arch")
        .arg("x86_64")
        .arg("--format")
        .arg("tgz")
        .arg("--dir")
        .arg(download_dir.path())
        .arg("--portal-url")
        .arg(&url);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Downloaded to"));

    let downloaded = download_dir.path().join("JLink_Linux_x86_64.tgz");
    assert!(downloaded.exists());
    assert_eq!(
        std::fs::read_to_string(&downloaded).unwrap(),
        "tarball bytes"
    );
}

#[test]
fn test_download_specific_version_not_listed() {
    let mut server = Server::new();
    let url = server.url();

    let _mock_page = server
        .mock("GET", "/")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(portal_page(&url))
        .create();

    let mut cmd = Command::new(cargo::cargo_bin!("jlink-update"));
    cmd.arg("download")
        .arg("--version")
        .arg("V9.99")
        .arg("--system")
        .arg("linux")
        .arg("--arch")
        .arg("x86_64")
        .arg("--portal-url")
        .arg(&url);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Could not find J-Link version"));
}

#[test]
fn test_download_no_package_for_host() {
    let mut server = Server::new();
    let url = server.url();

    let _mock_page = server
        .mock("GET", "/")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(portal_page(&url))
        .create();

    // The fixture publishes no macOS packages
    let mut cmd = Command::new(cargo::cargo_bin!("jlink-update"));
    cmd.arg("download")
        .arg("--system")
        .arg("macos")
        .arg("--arch")
        .arg("arm64")
        .arg("--portal-url")
        .arg(&url);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("No package found"));
}
