use std::collections::BTreeSet;

const KNOWN_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "js", "linux",
    "nacl", "netbsd", "openbsd", "plan9", "solaris", "wasip1", "windows", "zos",
];

const UNIX_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "linux",
    "netbsd", "openbsd", "solaris",
];

const KNOWN_ARCH: &[&str] = &[
    "386", "amd64", "amd64p32", "arm", "armbe", "arm64", "arm64be", "loong64", "mips", "mipsle",
    "mips64", "mips64le", "mips64p32", "mips64p32le", "ppc", "ppc64", "ppc64le", "riscv",
    "riscv64", "s390", "s390x", "sparc", "sparc64", "wasm",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTarget {
    pub goos: String,
    pub goarch: String,
    pub tags: BTreeSet<String>,
}

impl Default for BuildTarget {
    fn default() -> Self {
        Self::new("linux", "amd64")
    }
}

impl BuildTarget {
    pub fn new(goos: impl Into<String>, goarch: impl Into<String>) -> Self {
        Self {
            goos: goos.into(),
            goarch: goarch.into(),
            tags: BTreeSet::new(),
        }
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    // `cgo`, `ignore` and unknown tags only hold when listed in `tags`.
    pub fn has_tag(&self, tag: &str) -> bool {
        if self.matches_platform_tag(tag) || self.tags.contains(tag) {
            return true;
        }
        match tag {
            "gc" => true,
            "unix" => UNIX_OS.contains(&self.goos.as_str()),
            _ => is_release_tag(tag),
        }
    }

    fn matches_platform_tag(&self, tag: &str) -> bool {
        if tag == self.goos || tag == self.goarch {
            return true;
        }
        matches!(
            (self.goos.as_str(), tag),
            ("android", "linux") | ("illumos", "solaris") | ("ios", "darwin")
        )
    }

    pub fn matches_file_name(&self, file_name: &str) -> bool {
        let stem = file_name.strip_suffix(".go").unwrap_or(file_name);
        let Some(underscore) = stem.find('_') else {
            return true;
        };
        let mut parts = stem[underscore..].split('_').collect::<Vec<_>>();
        if parts.last() == Some(&"test") {
            parts.pop();
        }
        let count = parts.len();
        if count >= 2
            && KNOWN_OS.contains(&parts[count - 2])
            && KNOWN_ARCH.contains(&parts[count - 1])
        {
            return self.matches_platform_tag(parts[count - 2])
                && self.matches_platform_tag(parts[count - 1]);
        }
        if count >= 1 && (KNOWN_OS.contains(&parts[count - 1]) || KNOWN_ARCH.contains(&parts[count - 1]))
        {
            return self.matches_platform_tag(parts[count - 1]);
        }
        true
    }
}

fn is_release_tag(tag: &str) -> bool {
    tag.strip_prefix("go1.")
        .is_some_and(|minor| !minor.is_empty() && minor.chars().all(|ch| ch.is_ascii_digit()))
}

#[cfg(test)]
mod target_tests {
    use super::*;

    #[test]
    fn file_name_suffixes_select_platform_files() {
        let target = BuildTarget::default();
        assert!(target.matches_file_name("reader.go"));
        assert!(target.matches_file_name("file_unix.go"));
        assert!(target.matches_file_name("exec_linux.go"));
        assert!(target.matches_file_name("sys_linux_amd64.go"));
        assert!(target.matches_file_name("zerrors_linux_test.go"));
        assert!(!target.matches_file_name("exec_windows.go"));
        assert!(!target.matches_file_name("sys_linux_arm64.go"));
        assert!(!target.matches_file_name("asm_386.go"));
    }

    #[test]
    fn os_aliases_follow_go_rules() {
        let android = BuildTarget::new("android", "arm64");
        assert!(android.matches_file_name("net_linux.go"));
        assert!(android.has_tag("linux"));
        assert!(android.has_tag("unix"));
        assert!(!BuildTarget::new("windows", "amd64").has_tag("unix"));
    }

    #[test]
    fn tags_cover_release_and_custom_tags() {
        let target = BuildTarget::default().with_tags(["netgo"]);
        assert!(target.has_tag("go1.21"));
        assert!(target.has_tag("gc"));
        assert!(target.has_tag("netgo"));
        assert!(!target.has_tag("cgo"));
        assert!(!target.has_tag("ignore"));
        assert!(!target.has_tag("go1."));
    }
}
