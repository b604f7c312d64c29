//! Loader-plugin prefixes (`prefix!payload`).

/// What a raw reference name asks the resolver for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target<'n> {
    /// A script module; resolution may append `.js`.
    Module(&'n str),
    /// A plain file, taken as written.
    File(&'n str),
    /// A plugin the resolver does not understand.
    Unsupported {
        /// Text before the `!`.
        plugin: &'n str,
    },
}

impl<'n> Target<'n> {
    /// The name to resolve, if any.
    pub fn name(&self) -> Option<&'n str> {
        match self {
            Target::Module(name) | Target::File(name) => Some(name),
            Target::Unsupported { .. } => None,
        }
    }

    /// Whether the target is a script module.
    pub fn is_module(&self) -> bool {
        matches!(self, Target::Module(_))
    }
}

/// Split a raw name into its loader target.
///
/// `text!` yields a plain file and `i18n!` a module; any other prefix is
/// unsupported. Names without `!` are modules.
pub fn parse_target(name: &str) -> Target<'_> {
    match name.split_once('!') {
        None => Target::Module(name),
        Some(("text", payload)) => Target::File(payload),
        Some(("i18n", payload)) => Target::Module(payload),
        Some((plugin, _)) => Target::Unsupported { plugin },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_names_are_modules() {
        assert_eq!(parse_target("app/main"), Target::Module("app/main"));
    }

    #[test]
    fn test_known_plugins() {
        assert_eq!(parse_target("text!tpl/a.html"), Target::File("tpl/a.html"));
        assert_eq!(parse_target("i18n!nls/colors"), Target::Module("nls/colors"));
    }

    #[test]
    fn test_unknown_plugins() {
        assert_eq!(parse_target("domReady!"), Target::Unsupported { plugin: "domReady" });
        assert_eq!(parse_target("css!style.css"), Target::Unsupported { plugin: "css" });
        assert_eq!(parse_target("css!style.css").name(), None);
    }
}
