//! Optional version-manager bootstrap for the remote provisioning command.
//!
//! When the deployed kitchen carries an `.rvmrc`, the remote shell must
//! source rvm and activate that environment before chef-solo starts. The
//! probe and activation live in a single shell fragment prepended to the
//! provisioning command; a missing `.rvmrc` leaves the fragment as a no-op.

/// Builds the shell fragment that activates rvm for the deployed kitchen.
///
/// The leading `ls -l` probe is separated by a newline so its failure does
/// not short-circuit the line; only the `if` block participates in the
/// `&&` chain the caller assembles.
#[must_use]
pub fn preamble(cache_path: &str) -> String {
    let lines = [
        format!("ls -l {cache_path}/.rvmrc"),
        format!("if [[ -s {cache_path}/.rvmrc ]]; then"),
        String::from("  if [[ -s \"$HOME/.rvm/scripts/rvm\" ]]; then"),
        String::from("    source \"$HOME/.rvm/scripts/rvm\""),
        String::from("  elif [[ -s \"/usr/local/rvm/scripts/rvm\" ]]; then"),
        String::from("    source \"/usr/local/rvm/scripts/rvm\""),
        String::from("  fi"),
        format!("  cd {cache_path}"),
        String::from("  rvm current"),
        String::from("fi"),
    ];
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn preamble_probes_then_conditionally_activates() {
        let fragment = preamble("/var/chef-solo");

        assert!(fragment.starts_with("ls -l /var/chef-solo/.rvmrc\n"));
        assert!(fragment.contains("if [[ -s /var/chef-solo/.rvmrc ]]; then"));
        assert!(fragment.contains("source \"$HOME/.rvm/scripts/rvm\""));
        assert!(fragment.contains("source \"/usr/local/rvm/scripts/rvm\""));
        assert!(fragment.contains("\n  cd /var/chef-solo\n"));
        assert!(fragment.contains("rvm current"));
        assert!(fragment.ends_with("fi"));
    }

    #[rstest]
    fn preamble_prefers_the_user_level_install() {
        let fragment = preamble("/var/chef-solo");
        let user = fragment
            .find("$HOME/.rvm/scripts/rvm")
            .expect("user-level path present");
        let system = fragment
            .find("/usr/local/rvm/scripts/rvm")
            .expect("system-level path present");
        assert!(user < system);
    }
}
