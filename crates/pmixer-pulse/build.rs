//! Build script for pmixer-pulse.
//!
//! libpulse-sys does the linking. This only reports a missing libpulse
//! development package up front, naming the package to install, instead of
//! leaving a bare linker error.

fn main() {
    if pkg_config::get_variable("libpulse", "libdir").is_err() {
        println!("cargo:warning=pmixer-pulse: libpulse not visible to pkg-config");
        println!(
            "cargo:warning=pmixer-pulse: install libpulse-dev (Debian/Ubuntu) or pulseaudio-libs-devel (Fedora)"
        );
    }
}
