use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    TarGz,
}

impl ArchiveKind {
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::TarGz => "tar.gz",
        }
    }
}

/// Host platform in the naming convention of the release artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub os: String,
    pub arch: String,
}

impl Platform {
    #[must_use]
    pub fn current() -> Self {
        let platform = Self::new(std::env::consts::OS, std::env::consts::ARCH);
        debug!("Detected platform {}-{}", platform.os, platform.arch);
        platform
    }

    #[must_use]
    pub fn new(os: &str, arch: &str) -> Self {
        Self {
            os: normalize_os(os).to_string(),
            arch: normalize_arch(arch).to_string(),
        }
    }

    /// Windows releases ship as zip archives, everything else as tar.gz.
    #[must_use]
    pub fn archive_kind(&self) -> ArchiveKind {
        if self.os == "windows" {
            ArchiveKind::Zip
        } else {
            ArchiveKind::TarGz
        }
    }
}

fn normalize_os(os: &str) -> &str {
    match os {
        "macos" => "darwin",
        other => other,
    }
}

fn normalize_arch(arch: &str) -> &str {
    match arch {
        "amd64" | "x86_64" => "x64",
        "aarch64" => "arm64",
        other => other,
    }
}
