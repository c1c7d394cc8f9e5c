pub trait AliasStringExt {
    /// Lowercase and keep only `[a-z0-9]`.
    fn normalize_alias(&self) -> String;
}

impl AliasStringExt for str {
    fn normalize_alias(&self) -> String {
        self.trim()
            .chars()
            .flat_map(char::to_lowercase)
            .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
            .collect()
    }
}

impl AliasStringExt for String {
    fn normalize_alias(&self) -> String {
        self.as_str().normalize_alias()
    }
}
