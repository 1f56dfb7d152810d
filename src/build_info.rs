mod raw {
    // The constants generated by the `built` crate, e.g. `PKG_VERSION`, `FEATURES_STR`,
    // `GIT_COMMIT_HASH` and `GIT_DIRTY`. See https://docs.rs/built/latest/built/index.html
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

/// Crate version such as 0.1.0
pub const MMTK_PKG_VERSION: &str = raw::PKG_VERSION;

/// Comma separated features enabled for this build
pub const MMTK_FEATURES: &str = raw::FEATURES_STR;

lazy_static! {
    /// Git version such as a96e8f991c91a81df51e7975849441f52fdbcdcc, or
    /// a96e8f991c91a81df51e7975849441f52fdbcdcc-dirty, or unknown-git-version if the crate is
    /// not built from a git repo.
    pub static ref MMTK_GIT_VERSION: &'static str = &MMTK_GIT_VERSION_STRING;

    // Owned string
    static ref MMTK_GIT_VERSION_STRING: String = match (raw::GIT_COMMIT_HASH, raw::GIT_DIRTY) {
        (Some(hash), Some(true)) => format!("{}-dirty", hash),
        (Some(hash), _) => hash.to_string(),
        (None, _) => "unknown-git-version".to_string(),
    };

    /// Full build version, e.g. "0.1.0 (a96e8f991c91a81df51e7975849441f52fdbcdcc)".
    pub static ref MMTK_RC_FULL_VERSION: String = format!("{} ({})", MMTK_PKG_VERSION, *MMTK_GIT_VERSION);
}
