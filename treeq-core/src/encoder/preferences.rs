//! Encoder configuration
//!
//! Each format has its own preference struct with `new()` defaults and
//! `with_*` builders. [`Preferences`] bundles them so a registry factory can
//! pick out the part it needs.

/// YAML output options
#[derive(Debug, Clone)]
pub struct YamlPreferences {
    /// Spaces per nesting level
    pub indent: usize,
    /// Emit `---` between documents
    pub print_doc_separators: bool,
    /// Print top-level scalars as their raw value, without quoting
    pub unwrap_scalar: bool,
}

impl YamlPreferences {
    pub fn new() -> Self {
        YamlPreferences {
            indent: 2,
            print_doc_separators: true,
            unwrap_scalar: true,
        }
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent.max(1);
        self
    }

    pub fn with_doc_separators(mut self, print: bool) -> Self {
        self.print_doc_separators = print;
        self
    }

    pub fn with_unwrap_scalar(mut self, unwrap: bool) -> Self {
        self.unwrap_scalar = unwrap;
        self
    }
}

impl Default for YamlPreferences {
    fn default() -> Self {
        Self::new()
    }
}

/// JSON output options
#[derive(Debug, Clone)]
pub struct JsonPreferences {
    /// Spaces per nesting level; 0 prints compact single-line JSON
    pub indent: usize,
    /// Print top-level strings without quotes
    pub unwrap_scalar: bool,
}

impl JsonPreferences {
    pub fn new() -> Self {
        JsonPreferences {
            indent: 2,
            unwrap_scalar: false,
        }
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_unwrap_scalar(mut self, unwrap: bool) -> Self {
        self.unwrap_scalar = unwrap;
        self
    }
}

impl Default for JsonPreferences {
    fn default() -> Self {
        Self::new()
    }
}

/// Java properties output options
#[derive(Debug, Clone)]
pub struct PropertiesPreferences {
    /// Text between key and value
    pub key_value_separator: String,
    /// Render sequence indices as `key[0]` instead of `key.0`
    pub use_array_brackets: bool,
}

impl PropertiesPreferences {
    pub fn new() -> Self {
        PropertiesPreferences {
            key_value_separator: " = ".to_string(),
            use_array_brackets: false,
        }
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.key_value_separator = separator.into();
        self
    }

    pub fn with_array_brackets(mut self, brackets: bool) -> Self {
        self.use_array_brackets = brackets;
        self
    }
}

impl Default for PropertiesPreferences {
    fn default() -> Self {
        Self::new()
    }
}

/// Delimited-text output options (CSV and TSV)
#[derive(Debug, Clone)]
pub struct CsvPreferences {
    pub separator: char,
}

impl CsvPreferences {
    pub fn csv() -> Self {
        CsvPreferences { separator: ',' }
    }

    pub fn tsv() -> Self {
        CsvPreferences { separator: '\t' }
    }
}

/// XML output options
#[derive(Debug, Clone)]
pub struct XmlPreferences {
    /// Spaces per nesting level; 0 prints everything on one line
    pub indent: usize,
    /// Mapping keys with this prefix become attributes
    pub attribute_prefix: String,
    /// Mapping key holding an element's text content
    pub content_name: String,
}

impl XmlPreferences {
    pub fn new() -> Self {
        XmlPreferences {
            indent: 2,
            attribute_prefix: "+@".to_string(),
            content_name: "+content".to_string(),
        }
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_attribute_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.attribute_prefix = prefix.into();
        self
    }

    pub fn with_content_name(mut self, name: impl Into<String>) -> Self {
        self.content_name = name.into();
        self
    }
}

impl Default for XmlPreferences {
    fn default() -> Self {
        Self::new()
    }
}

/// Lua output options
#[derive(Debug, Clone)]
pub struct LuaPreferences {
    /// Written before each document's table
    pub doc_prefix: String,
    /// Written after each document's table
    pub doc_suffix: String,
    /// Write identifier-like keys bare (`key = v`) instead of `["key"] = v`
    pub unquoted_keys: bool,
    /// Assign top-level mapping entries as globals instead of returning a table
    pub globals: bool,
}

impl LuaPreferences {
    pub fn new() -> Self {
        LuaPreferences {
            doc_prefix: "return ".to_string(),
            doc_suffix: ";\n".to_string(),
            unquoted_keys: false,
            globals: false,
        }
    }

    pub fn with_unquoted_keys(mut self, unquoted: bool) -> Self {
        self.unquoted_keys = unquoted;
        self
    }

    pub fn with_globals(mut self, globals: bool) -> Self {
        self.globals = globals;
        self
    }
}

impl Default for LuaPreferences {
    fn default() -> Self {
        Self::new()
    }
}

/// All encoder preferences, handed to registry factories
#[derive(Debug, Clone)]
pub struct Preferences {
    pub yaml: YamlPreferences,
    pub json: JsonPreferences,
    pub properties: PropertiesPreferences,
    pub csv: CsvPreferences,
    pub tsv: CsvPreferences,
    pub xml: XmlPreferences,
    pub lua: LuaPreferences,
}

impl Preferences {
    pub fn new() -> Self {
        Preferences {
            yaml: YamlPreferences::new(),
            json: JsonPreferences::new(),
            properties: PropertiesPreferences::new(),
            csv: CsvPreferences::csv(),
            tsv: CsvPreferences::tsv(),
            xml: XmlPreferences::new(),
            lua: LuaPreferences::new(),
        }
    }

    /// Set the indent of every indenting format (yaml, json, xml)
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.yaml = self.yaml.with_indent(indent);
        self.json = self.json.with_indent(indent);
        self.xml = self.xml.with_indent(indent);
        self
    }

    pub fn with_doc_separators(mut self, print: bool) -> Self {
        self.yaml = self.yaml.with_doc_separators(print);
        self
    }

    /// Print top-level scalars raw in yaml and json
    pub fn with_unwrap_scalar(mut self, unwrap: bool) -> Self {
        self.yaml = self.yaml.with_unwrap_scalar(unwrap);
        self.json = self.json.with_unwrap_scalar(unwrap);
        self
    }
}

impl Default for Preferences {
    fn default() -> Self {
        Self::new()
    }
}
