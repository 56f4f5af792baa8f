/// A module the editor knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleEntry {
    /// Section name in the document.
    pub name: &'static str,
    /// Listed under the "common" category.
    pub is_common: bool,
}

const fn common(name: &'static str) -> ModuleEntry {
    ModuleEntry {
        name,
        is_common: true,
    }
}

const fn other(name: &'static str) -> ModuleEntry {
    ModuleEntry {
        name,
        is_common: false,
    }
}

/// Known modules in sidebar order.
pub const MODULES: &[ModuleEntry] = &[
    common("character"),
    common("directory"),
    common("git_branch"),
    common("git_status"),
    common("time"),
    common("cmd_duration"),
    common("status"),
    common("python"),
    common("nodejs"),
    common("rust"),
    common("aws"),
    common("gcloud"),
    other("azure"),
    other("battery"),
    other("c"),
    other("cmake"),
    other("conda"),
    other("container"),
    other("docker_context"),
    other("dotnet"),
    other("env_var"),
    other("git_commit"),
    other("git_metrics"),
    other("git_state"),
    other("golang"),
    other("hostname"),
    other("java"),
    other("jobs"),
    other("kubernetes"),
    other("line_break"),
    other("localip"),
    other("lua"),
    other("memory_usage"),
    other("nix_shell"),
    other("os"),
    other("package"),
    other("php"),
    other("ruby"),
    other("shell"),
    other("shlvl"),
    other("sudo"),
    other("terraform"),
    other("username"),
    other("zig"),
];

/// All known modules in sidebar order.
pub fn all_modules() -> &'static [ModuleEntry] {
    MODULES
}

/// Whether `name` is in the catalog.
pub fn is_known(name: &str) -> bool {
    MODULES.iter().any(|m| m.name == name)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_names_are_unique() {
        let names: HashSet<_> = MODULES.iter().map(|m| m.name).collect();
        assert_eq!(names.len(), MODULES.len());
    }

    #[test]
    fn test_common_subset() {
        let common: Vec<_> = all_modules().iter().filter(|m| m.is_common).collect();
        assert_eq!(common.len(), 12);
        assert!(is_known("git_branch"));
        assert!(!is_known("no_such_module"));
    }
}
