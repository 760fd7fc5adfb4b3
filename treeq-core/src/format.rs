//! Output format registry
//!
//! Static table of output formats. Each entry maps a canonical name and its
//! short aliases to an encoder factory. Lookup is exact; the first entry in
//! declaration order wins.

use std::fmt;

use thiserror::Error;

use crate::encoder::csv::CsvEncoder;
use crate::encoder::json::JsonEncoder;
use crate::encoder::lua::LuaEncoder;
use crate::encoder::properties::PropertiesEncoder;
use crate::encoder::shell::ShellVariablesEncoder;
use crate::encoder::toml::TomlEncoder;
use crate::encoder::xml::XmlEncoder;
use crate::encoder::yaml::YamlEncoder;
use crate::encoder::{Encoder, Preferences};

/// Errors from format resolution and encoder construction
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("unknown format '{name}' please use [{available}]")]
    UnknownFormat { name: String, available: String },
    #[error("reserved output format has no built-in encoder")]
    NoEncoder,
}

/// Builds an encoder, picking its options out of the preferences bundle
pub type EncoderFactory = fn(&Preferences) -> Box<dyn Encoder>;

/// A registered output format
pub struct PrinterOutputFormat {
    /// Canonical name (e.g., "yaml"); empty for reserved slots
    pub formal_name: &'static str,
    /// Short aliases (e.g., "y", "yml")
    pub names: &'static [&'static str],
    /// Encoder constructor; `None` for reserved slots handled by the CLI
    pub encoder_factory: Option<EncoderFactory>,
}

impl fmt::Debug for PrinterOutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrinterOutputFormat")
            .field("formal_name", &self.formal_name)
            .field("names", &self.names)
            .finish_non_exhaustive()
    }
}

impl PrinterOutputFormat {
    /// Exact match against the canonical name or any alias
    pub fn matches_name(&self, name: &str) -> bool {
        if name.is_empty() {
            return false;
        }
        self.formal_name == name || self.names.contains(&name)
    }

    /// Build an encoder for this format
    pub fn construct(&self, prefs: &Preferences) -> Result<Box<dyn Encoder>, FormatError> {
        match self.encoder_factory {
            Some(factory) => Ok(factory(prefs)),
            None => Err(FormatError::NoEncoder),
        }
    }

    /// Build an encoder with default preferences
    pub fn configured_encoder(&self) -> Result<Box<dyn Encoder>, FormatError> {
        self.construct(&Preferences::default())
    }

    /// File extension used when splitting output into files
    pub fn extension(&self) -> &'static str {
        match self.formal_name {
            "yaml" => "yml",
            "props" => "properties",
            "shell" => "sh",
            name => name,
        }
    }
}

fn yaml_encoder(prefs: &Preferences) -> Box<dyn Encoder> {
    Box::new(YamlEncoder::new(prefs.yaml.clone()))
}

fn json_encoder(prefs: &Preferences) -> Box<dyn Encoder> {
    Box::new(JsonEncoder::new(prefs.json.clone()))
}

fn properties_encoder(prefs: &Preferences) -> Box<dyn Encoder> {
    Box::new(PropertiesEncoder::new(prefs.properties.clone()))
}

fn csv_encoder(prefs: &Preferences) -> Box<dyn Encoder> {
    Box::new(CsvEncoder::new(prefs.csv.clone()))
}

fn tsv_encoder(prefs: &Preferences) -> Box<dyn Encoder> {
    Box::new(CsvEncoder::new(prefs.tsv.clone()))
}

fn xml_encoder(prefs: &Preferences) -> Box<dyn Encoder> {
    Box::new(XmlEncoder::new(prefs.xml.clone()))
}

fn toml_encoder(_prefs: &Preferences) -> Box<dyn Encoder> {
    Box::new(TomlEncoder::new())
}

fn shell_encoder(_prefs: &Preferences) -> Box<dyn Encoder> {
    Box::new(ShellVariablesEncoder::new())
}

fn lua_encoder(prefs: &Preferences) -> Box<dyn Encoder> {
    Box::new(LuaEncoder::new(prefs.lua.clone()))
}

pub static YAML_OUTPUT_FORMAT: PrinterOutputFormat = PrinterOutputFormat {
    formal_name: "yaml",
    names: &["y", "yml"],
    encoder_factory: Some(yaml_encoder),
};

pub static JSON_OUTPUT_FORMAT: PrinterOutputFormat = PrinterOutputFormat {
    formal_name: "json",
    names: &["j"],
    encoder_factory: Some(json_encoder),
};

pub static PROPS_OUTPUT_FORMAT: PrinterOutputFormat = PrinterOutputFormat {
    formal_name: "props",
    names: &["p", "properties"],
    encoder_factory: Some(properties_encoder),
};

pub static CSV_OUTPUT_FORMAT: PrinterOutputFormat = PrinterOutputFormat {
    formal_name: "csv",
    names: &["c"],
    encoder_factory: Some(csv_encoder),
};

pub static TSV_OUTPUT_FORMAT: PrinterOutputFormat = PrinterOutputFormat {
    formal_name: "tsv",
    names: &["t"],
    encoder_factory: Some(tsv_encoder),
};

pub static XML_OUTPUT_FORMAT: PrinterOutputFormat = PrinterOutputFormat {
    formal_name: "xml",
    names: &["x"],
    encoder_factory: Some(xml_encoder),
};

// Reserved slots: the CLI layer gives these their names and encoders.
pub static BASE64_OUTPUT_FORMAT: PrinterOutputFormat = PrinterOutputFormat {
    formal_name: "",
    names: &[],
    encoder_factory: None,
};

pub static URI_OUTPUT_FORMAT: PrinterOutputFormat = PrinterOutputFormat {
    formal_name: "",
    names: &[],
    encoder_factory: None,
};

pub static SH_OUTPUT_FORMAT: PrinterOutputFormat = PrinterOutputFormat {
    formal_name: "",
    names: &[],
    encoder_factory: None,
};

pub static TOML_OUTPUT_FORMAT: PrinterOutputFormat = PrinterOutputFormat {
    formal_name: "toml",
    names: &[],
    encoder_factory: Some(toml_encoder),
};

pub static SHELL_VARIABLES_OUTPUT_FORMAT: PrinterOutputFormat = PrinterOutputFormat {
    formal_name: "shell",
    names: &["s", "sh"],
    encoder_factory: Some(shell_encoder),
};

pub static LUA_OUTPUT_FORMAT: PrinterOutputFormat = PrinterOutputFormat {
    formal_name: "lua",
    names: &["l"],
    encoder_factory: Some(lua_encoder),
};

/// All registered formats, in lookup order
pub static FORMATS: &[&PrinterOutputFormat] = &[
    &YAML_OUTPUT_FORMAT,
    &JSON_OUTPUT_FORMAT,
    &PROPS_OUTPUT_FORMAT,
    &CSV_OUTPUT_FORMAT,
    &TSV_OUTPUT_FORMAT,
    &XML_OUTPUT_FORMAT,
    &BASE64_OUTPUT_FORMAT,
    &URI_OUTPUT_FORMAT,
    &SH_OUTPUT_FORMAT,
    &TOML_OUTPUT_FORMAT,
    &SHELL_VARIABLES_OUTPUT_FORMAT,
    &LUA_OUTPUT_FORMAT,
];

/// Find a format by canonical name or alias
pub fn resolve(name: &str) -> Result<&'static PrinterOutputFormat, FormatError> {
    FORMATS
        .iter()
        .copied()
        .find(|format| format.matches_name(name))
        .ok_or_else(|| FormatError::UnknownFormat {
            name: name.to_string(),
            available: describe_available(),
        })
}

/// Canonical names plus the first alias of each, joined for help text
pub fn describe_available() -> String {
    let mut names = Vec::new();
    for format in FORMATS {
        if !format.formal_name.is_empty() {
            names.push(format.formal_name);
        }
        if let Some(first) = format.names.first() {
            names.push(*first);
        }
    }
    names.join("|")
}
