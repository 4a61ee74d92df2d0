/// Value of `--flag value` or `--flag=value`; blank values count as absent.
pub fn arg_value(args: &[String], flag: &str) -> Option<String> {
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&prefix) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

pub fn cli_args() -> Vec<String> {
    std::env::args().skip(1).collect()
}

#[cfg(test)]
mod tests {
    use super::arg_value;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn reads_both_flag_forms() {
        let a = args(&["--league", "ENG-Premier League", "--season=2022-23"]);
        assert_eq!(arg_value(&a, "--league").as_deref(), Some("ENG-Premier League"));
        assert_eq!(arg_value(&a, "--season").as_deref(), Some("2022-23"));
        assert_eq!(arg_value(&a, "--team"), None);
    }

    #[test]
    fn blank_values_are_ignored() {
        let a = args(&["--team=", "--data-dir"]);
        assert_eq!(arg_value(&a, "--team"), None);
        assert_eq!(arg_value(&a, "--data-dir"), None);
    }
}
