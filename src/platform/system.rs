//! Process-level facts about the host: CI and privilege detection.

/// Check if running in a CI environment.
///
/// Used by `main()` to force the non-interactive UI. Checks common CI
/// environment variables: `CI`, `GITHUB_ACTIONS`, `GITLAB_CI`, `CIRCLECI`,
/// `TRAVIS`, `JENKINS_URL`.
pub fn is_ci() -> bool {
    ["CI", "GITHUB_ACTIONS", "GITLAB_CI", "CIRCLECI", "TRAVIS", "JENKINS_URL"]
        .iter()
        .any(|var| std::env::var(var).is_ok())
}

/// Check if running as root/admin.
pub fn is_elevated() -> bool {
    #[cfg(unix)]
    {
        // SAFETY: geteuid() is a simple syscall that returns the effective user ID
        unsafe { libc::geteuid() == 0 }
    }

    #[cfg(windows)]
    {
        std::env::var("ADMIN").is_ok()
    }

    #[cfg(not(any(unix, windows)))]
    {
        false
    }
}

/// Hint appended to permission errors.
pub fn privilege_hint() -> &'static str {
    if is_elevated() {
        "check the ownership of the installation prefix"
    } else if cfg!(windows) {
        "rerun from an administrator prompt or choose another --prefix"
    } else {
        "rerun with sudo or choose a writable --prefix"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_ci_does_not_panic() {
        let _ = is_ci();
    }

    #[test]
    fn privilege_hint_is_not_empty() {
        assert!(!privilege_hint().is_empty());
    }
}
