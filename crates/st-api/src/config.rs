use std::fs;
use std::path::Path;

use serde::Deserialize;
use st_core::{ScopeConfig, SigTableError};

pub const DEFAULT_PACKAGE_NAME: &str = "interfacer";

// `internal` entries show up in the scope list but are never loaded.
pub const DEFAULT_STD_PACKAGES: &[&str] = &[
    "archive/tar",
    "archive/zip",
    "bufio",
    "bytes",
    "compress/bzip2",
    "compress/flate",
    "compress/gzip",
    "compress/lzw",
    "compress/zlib",
    "container/heap",
    "container/list",
    "container/ring",
    "context",
    "crypto",
    "crypto/aes",
    "crypto/cipher",
    "crypto/des",
    "crypto/dsa",
    "crypto/ecdsa",
    "crypto/elliptic",
    "crypto/hmac",
    "crypto/md5",
    "crypto/rand",
    "crypto/rc4",
    "crypto/rsa",
    "crypto/sha1",
    "crypto/sha256",
    "crypto/sha512",
    "crypto/subtle",
    "crypto/tls",
    "crypto/x509",
    "crypto/x509/pkix",
    "database/sql",
    "database/sql/driver",
    "debug/dwarf",
    "debug/elf",
    "debug/gosym",
    "debug/macho",
    "debug/pe",
    "debug/plan9obj",
    "encoding",
    "encoding/ascii85",
    "encoding/asn1",
    "encoding/base32",
    "encoding/base64",
    "encoding/binary",
    "encoding/csv",
    "encoding/gob",
    "encoding/hex",
    "encoding/json",
    "encoding/pem",
    "encoding/xml",
    "errors",
    "expvar",
    "flag",
    "fmt",
    "go/ast",
    "go/build",
    "go/constant",
    "go/doc",
    "go/format",
    "go/importer",
    "go/parser",
    "go/printer",
    "go/scanner",
    "go/token",
    "go/types",
    "hash",
    "hash/adler32",
    "hash/crc32",
    "hash/crc64",
    "hash/fnv",
    "html",
    "html/template",
    "image",
    "image/color",
    "image/color/palette",
    "image/draw",
    "image/gif",
    "image/jpeg",
    "image/png",
    "index/suffixarray",
    "internal/poll",
    "internal/testenv",
    "io",
    "io/fs",
    "io/ioutil",
    "log",
    "log/syslog",
    "math",
    "math/big",
    "math/bits",
    "math/cmplx",
    "math/rand",
    "mime",
    "mime/multipart",
    "mime/quotedprintable",
    "net",
    "net/http",
    "net/http/cgi",
    "net/http/cookiejar",
    "net/http/fcgi",
    "net/http/httptest",
    "net/http/httptrace",
    "net/http/httputil",
    "net/http/internal",
    "net/http/pprof",
    "net/mail",
    "net/rpc",
    "net/rpc/jsonrpc",
    "net/smtp",
    "net/textproto",
    "net/url",
    "os",
    "os/exec",
    "os/signal",
    "os/user",
    "path",
    "path/filepath",
    "reflect",
    "regexp",
    "regexp/syntax",
    "runtime",
    "runtime/debug",
    "runtime/pprof",
    "runtime/trace",
    "sort",
    "strconv",
    "strings",
    "sync",
    "sync/atomic",
    "syscall",
    "testing",
    "testing/iotest",
    "testing/quick",
    "text/scanner",
    "text/tabwriter",
    "text/template",
    "text/template/parse",
    "time",
    "unicode",
    "unicode/utf16",
    "unicode/utf8",
];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ScopeEntry {
    Path(String),
    Detailed {
        path: String,
        #[serde(default)]
        private: Option<bool>,
    },
}

impl ScopeEntry {
    pub fn to_scope(&self) -> ScopeConfig {
        match self {
            Self::Path(path) => ScopeConfig::inferred(path.as_str()),
            Self::Detailed {
                path,
                private: Some(true),
            } => ScopeConfig::private(path.as_str()),
            Self::Detailed {
                path,
                private: Some(false),
            } => ScopeConfig::public(path.as_str()),
            Self::Detailed {
                path,
                private: None,
            } => ScopeConfig::inferred(path.as_str()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default)]
    pub goos: Option<String>,
    #[serde(default)]
    pub goarch: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub scopes: Option<Vec<ScopeEntry>>,
}

impl GeneratorConfig {
    pub fn scopes(&self) -> Vec<ScopeConfig> {
        let mut scopes = match &self.scopes {
            Some(entries) => entries.iter().map(ScopeEntry::to_scope).collect(),
            None => default_std_scopes(),
        };
        if !scopes.iter().any(ScopeConfig::is_universe) {
            scopes.insert(0, ScopeConfig::universe());
        }
        scopes
    }
}

pub fn default_std_scopes() -> Vec<ScopeConfig> {
    std::iter::once(ScopeConfig::universe())
        .chain(DEFAULT_STD_PACKAGES.iter().map(|path| ScopeConfig::inferred(*path)))
        .collect()
}

pub fn parse_config(raw: &str) -> Result<GeneratorConfig, SigTableError> {
    serde_json::from_str(raw).map_err(|error| {
        SigTableError::new(
            "CONFIG_INVALID",
            format!("Invalid configuration: {}", error),
        )
    })
}

pub fn load_config_file(path: &Path) -> Result<GeneratorConfig, SigTableError> {
    let raw = fs::read_to_string(path).map_err(|error| {
        SigTableError::new(
            "CONFIG_READ",
            format!("Failed to read config {}: {}", path.display(), error),
        )
    })?;
    parse_config(&raw)
}
