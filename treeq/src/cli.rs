//! CLI argument parsing using clap

use clap::Parser;
use treeq_core::encoder::Preferences;

/// Re-encode YAML/JSON documents into another structured format
#[derive(Parser, Debug)]
#[command(name = "treeq")]
#[command(author, about, long_about = None, disable_version_flag = true)]
#[command(after_help = r#"EXAMPLES:
    # Convert a YAML file to JSON
    treeq config.yaml -o json

    # Flatten several files into properties, one document after another
    treeq a.yaml b.yaml -o props

    # NUL-separated values for xargs -0
    treeq -r -0 names.yaml | xargs -0 -n1 echo

    # Reformat the YAML header of a Markdown file, keeping the body
    treeq -f post.md

    # Write every document into its own file
    treeq all.yaml -o json --split-dir out --split-name '{file}-{doc}'
"#)]
pub struct Args {
    /// Input files; reads stdin when none are given
    #[arg()]
    pub files: Vec<String>,

    /// Output format: yaml, json, props, csv, tsv, xml, toml, shell, lua (or a short alias)
    #[arg(short = 'o', long = "output-format", default_value = "yaml")]
    pub output_format: String,

    /// Separate printed records with NUL instead of newlines
    #[arg(short = '0', long = "nul-output")]
    pub nul_output: bool,

    /// Treat inputs as front matter: only the leading YAML header is processed,
    /// the remaining content is printed unchanged after it
    #[arg(short = 'f', long = "front-matter")]
    pub front_matter: bool,

    /// Exit with status 1 when nothing but null or false was printed
    #[arg(short = 'e', long = "exit-status")]
    pub exit_status: bool,

    /// Indentation for yaml, json and xml output
    #[arg(short = 'I', long = "indent")]
    pub indent: Option<usize>,

    /// Don't print document separators (---)
    #[arg(short = 'N', long = "no-doc")]
    pub no_doc: bool,

    /// Print scalars without quotes (default: on for yaml, off for json)
    #[arg(short = 'r', long = "unwrap-scalar", num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub unwrap_scalar: Option<bool>,

    /// Separator between keys and values in props output
    #[arg(long = "properties-separator")]
    pub properties_separator: Option<String>,

    /// Use brackets for array indices in props output (a[0] instead of a.0)
    #[arg(long = "properties-array-brackets")]
    pub properties_array_brackets: bool,

    /// Prefix marking mapping keys as XML attributes
    #[arg(long = "xml-attribute-prefix")]
    pub xml_attribute_prefix: Option<String>,

    /// Mapping key holding an XML element's text
    #[arg(long = "xml-content-name")]
    pub xml_content_name: Option<String>,

    /// Write Lua keys as bare identifiers where possible
    #[arg(long = "lua-unquoted")]
    pub lua_unquoted: bool,

    /// Write top-level Lua keys as global assignments
    #[arg(long = "lua-globals")]
    pub lua_globals: bool,

    /// Write each document into its own file in this directory
    #[arg(long = "split-dir")]
    pub split_dir: Option<String>,

    /// File name template for --split-dir ({file}, {doc}, {index})
    #[arg(long = "split-name", default_value = "{file}-{doc}")]
    pub split_name: String,

    /// List output formats and exit
    #[arg(long = "list-formats")]
    pub list_formats: bool,

    /// Print version information
    #[arg(short = 'V', long = "version")]
    pub version: bool,

    /// Print version information including library versions
    #[arg(long = "version-verbose")]
    pub version_verbose: bool,

    /// Show verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl Args {
    /// Encoder preferences selected by the flags
    pub fn preferences(&self) -> Preferences {
        let mut prefs = Preferences::new().with_doc_separators(!self.no_doc);
        if let Some(indent) = self.indent {
            prefs = prefs.with_indent(indent);
        }
        if let Some(unwrap) = self.unwrap_scalar {
            prefs = prefs.with_unwrap_scalar(unwrap);
        }
        if let Some(separator) = &self.properties_separator {
            prefs.properties = prefs.properties.with_separator(separator.as_str());
        }
        prefs.properties = prefs.properties.with_array_brackets(self.properties_array_brackets);
        if let Some(prefix) = &self.xml_attribute_prefix {
            prefs.xml = prefs.xml.with_attribute_prefix(prefix.as_str());
        }
        if let Some(name) = &self.xml_content_name {
            prefs.xml = prefs.xml.with_content_name(name.as_str());
        }
        prefs.lua = prefs
            .lua
            .with_unquoted_keys(self.lua_unquoted)
            .with_globals(self.lua_globals);
        prefs
    }
}
