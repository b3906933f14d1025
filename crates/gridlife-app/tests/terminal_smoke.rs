use std::process::Command;

#[test]
fn terminal_headless_smoke() {
    let bin = env!("CARGO_BIN_EXE_gridlife-app");
    let status = Command::new(bin)
        .args([
            "--width",
            "240",
            "--height",
            "120",
            "--cell-size",
            "8",
            "--generations",
            "12",
            "--frame-delay-ms",
            "0",
            "--seed",
            "7",
        ])
        .env("GRIDLIFE_HEADLESS", "1")
        .env("TERM", "xterm-256color")
        .env("RUST_LOG", "off")
        .status()
        .expect("failed to run gridlife-app binary");
    assert!(status.success(), "terminal headless run failed");
}
