use super::*;

#[test]
fn test_valid_package_names() {
    assert!(validate_package_name("firefox").is_ok());
    assert!(validate_package_name("yay-bin").is_ok());
    assert!(validate_package_name("python3.12").is_ok());
    assert!(validate_package_name("org.mozilla.firefox").is_ok());
    assert!(validate_package_name("gcc++").is_ok());
    assert!(validate_package_name("node_modules").is_ok());
}

#[test]
fn test_shell_injection_blocked() {
    assert!(validate_package_name("foo; rm -rf /").is_err());
    assert!(validate_package_name("foo | cat").is_err());
    assert!(validate_package_name("foo$(cat)").is_err());
    assert!(validate_package_name("foo && echo").is_err());
    assert!(validate_package_name("foo bar").is_err());
}

#[test]
fn test_option_like_names_blocked() {
    assert!(validate_package_name("--noconfirm").is_err());
    assert!(validate_package_name("-Rns").is_err());
}

#[test]
fn test_path_traversal_blocked() {
    assert!(validate_package_name("../../../etc/passwd").is_err());
    assert!(validate_package_name("foo/../bar").is_err());
}

#[test]
fn test_empty_and_long_names() {
    assert!(validate_package_name("").is_err());
    let long_name = "a".repeat(300);
    assert!(validate_package_name(&long_name).is_err());
}

#[test]
fn test_path_component_rejects_slash() {
    assert!(validate_path_component("paru-bin").is_ok());
    assert!(validate_path_component("extra/paru").is_err());
}
