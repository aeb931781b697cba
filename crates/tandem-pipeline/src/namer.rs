//! Output naming: stable names in development, content-addressed names in
//! production, one fixed name for the server bundle.

use sha2::{Digest, Sha256};
use tandem_config::{AssetClass, Configuration, NamingStrategy};

/// Length of the truncated content digest used in production filenames.
const CONTENT_HASH_LEN: usize = 20;

/// Computes deployed filenames for processed assets.
pub struct OutputNamer<'a> {
    config: &'a Configuration,
}

impl<'a> OutputNamer<'a> {
    pub fn new(config: &'a Configuration) -> Self {
        OutputNamer { config }
    }

    /// Deployed name for an asset's primary output unit.
    ///
    /// Development names are stable and human-debuggable, derived from
    /// the full source-relative identifier with only the extension
    /// remapped, so two sources with the same basename in different
    /// directories never claim one deployed name. They are reused across
    /// builds, which is acceptable because dev output is never cached
    /// downstream. Production names are derived from a SHA-256 digest of
    /// the final output buffer: identical content always yields the
    /// identical name, changed content changes the name.
    pub fn name(&self, source_id: &str, class: AssetClass, output: &[u8]) -> String {
        Self::apply(&self.config.naming, source_id, class, output)
    }

    /// Deployed name for a secondary chunk. Stable chunk names carry a
    /// `.chk` infix so they never shadow a primary unit.
    pub fn chunk_name(&self, logical_name: &str, class: AssetClass, output: &[u8]) -> String {
        match &self.config.chunk_naming {
            NamingStrategy::Stable | NamingStrategy::Fixed(_) => {
                let ext = deployed_extension(class, logical_name);
                let stem = logical_stem(logical_name);
                match class {
                    AssetClass::Script => format!("{stem}.chk.{ext}"),
                    _ => format!("{stem}.{ext}"),
                }
            }
            NamingStrategy::ContentHash => hashed_name(logical_name, class, output),
        }
    }

    fn apply(strategy: &NamingStrategy, source_id: &str, class: AssetClass, output: &[u8]) -> String {
        match strategy {
            NamingStrategy::Stable => stable_name(source_id, class),
            NamingStrategy::ContentHash => hashed_name(source_id, class, output),
            NamingStrategy::Fixed(name) => name.clone(),
        }
    }
}

/// Stable name: the source-relative identifier with the deployed
/// extension. Keeping the directory part means identifiers stay unique,
/// exactly like manifest keys.
fn stable_name(source_id: &str, class: AssetClass) -> String {
    let stem = logical_stem(source_id);
    let ext = deployed_extension(class, source_id);
    match source_id.rsplit_once('/') {
        Some((dir, _)) => format!("{dir}/{stem}.{ext}"),
        None => format!("{stem}.{ext}"),
    }
}

fn hashed_name(source_id: &str, class: AssetClass, output: &[u8]) -> String {
    let digest = Sha256::digest(output);
    let hex = format!("{digest:x}");
    format!(
        "{}.{}",
        &hex[..CONTENT_HASH_LEN],
        deployed_extension(class, source_id)
    )
}

/// Extension of the deployed artifact. Scripts and stylesheets compile to
/// `js`/`css` regardless of their source extension; binary assets keep
/// their own.
fn deployed_extension(class: AssetClass, source_id: &str) -> String {
    match class {
        AssetClass::Script => "js".to_string(),
        AssetClass::Stylesheet => "css".to_string(),
        AssetClass::FontOrMedia | AssetClass::RasterImage => source_id
            .rsplit('.')
            .next()
            .unwrap_or("bin")
            .to_ascii_lowercase(),
    }
}

/// Last path segment without its extension.
fn logical_stem(source_id: &str) -> String {
    let file = source_id.rsplit('/').next().unwrap_or(source_id);
    match file.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => file.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_config::{BaseTemplate, BuildMode, BuildTarget};

    fn config(target: BuildTarget, mode: BuildMode) -> Configuration {
        tandem_config::derive(&BaseTemplate::default(), target, mode).unwrap()
    }

    #[test]
    fn dev_names_are_stable_and_readable() {
        let config = config(BuildTarget::Browser, BuildMode::Development);
        let namer = OutputNamer::new(&config);
        assert_eq!(namer.name("app.js", AssetClass::Script, b"one"), "app.js");
        assert_eq!(namer.name("app.js", AssetClass::Script, b"two"), "app.js");
        assert_eq!(
            namer.name("theme.scss", AssetClass::Stylesheet, b"x"),
            "theme.css"
        );
        assert_eq!(
            namer.name("fonts/inter.woff2", AssetClass::FontOrMedia, b"x"),
            "fonts/inter.woff2"
        );
    }

    #[test]
    fn stable_names_keep_the_directory_part() {
        let config = config(BuildTarget::Browser, BuildMode::Development);
        let namer = OutputNamer::new(&config);
        assert_ne!(
            namer.name("a/util.js", AssetClass::Script, b"a"),
            namer.name("b/util.js", AssetClass::Script, b"b"),
            "same basename in different directories must not collide"
        );
        assert_eq!(namer.name("a/util.js", AssetClass::Script, b"a"), "a/util.js");
    }

    #[test]
    fn production_names_are_content_addressed() {
        let config = config(BuildTarget::Browser, BuildMode::Production);
        let namer = OutputNamer::new(&config);

        let a = namer.name("app.js", AssetClass::Script, b"let x = 1;");
        let b = namer.name("app.js", AssetClass::Script, b"let x = 1;");
        assert_eq!(a, b, "identical content, identical name");
        assert_eq!(a.len(), CONTENT_HASH_LEN + ".js".len());
        assert!(a.ends_with(".js"));

        let changed = namer.name("app.js", AssetClass::Script, b"let x = 2;");
        assert_ne!(a, changed, "changed content, changed name");
    }

    #[test]
    fn similar_but_differing_buffers_get_distinct_names() {
        let config = config(BuildTarget::Browser, BuildMode::Production);
        let namer = OutputNamer::new(&config);
        let base: Vec<u8> = vec![0xAB; 4096];
        let mut tweaked = base.clone();
        *tweaked.last_mut().unwrap() = 0xAC;
        assert_ne!(
            namer.name("a.png", AssetClass::RasterImage, &base),
            namer.name("a.png", AssetClass::RasterImage, &tweaked)
        );
    }

    #[test]
    fn server_bundle_name_is_fixed() {
        let config = config(BuildTarget::ServerExecutable, BuildMode::Production);
        let namer = OutputNamer::new(&config);
        assert_eq!(
            namer.name("components/App.jsx", AssetClass::Script, b"anything"),
            "App.js"
        );
    }

    #[test]
    fn stable_chunk_names_carry_the_chk_infix() {
        let config = config(BuildTarget::Browser, BuildMode::Development);
        let namer = OutputNamer::new(&config);
        assert_eq!(
            namer.chunk_name("vendors", AssetClass::Script, b"x"),
            "vendors.chk.js"
        );
        assert_eq!(
            namer.chunk_name("styles", AssetClass::Stylesheet, b"x"),
            "styles.css"
        );
    }
}
