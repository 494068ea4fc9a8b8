//! Generator configuration (mkgen.toml format) and the source/build layout.

use crate::error::BuildError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Tool names written into the Makefile preamble.
    pub toolchain: ToolchainConfig,

    /// Language standards, optimization and warning flags.
    pub flags: FlagsConfig,

    /// Protobuf/gRPC include and library flags.
    pub protobuf: ProtobufConfig,
}

/// Tool names. `CC`, `CXX` and `CCH` are emitted with `?=` so the
/// environment can still override them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    pub cc: String,
    pub cxx: String,
    pub cch: String,
    pub protoc: String,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            cc: "gcc".to_string(),
            cxx: "g++".to_string(),
            cch: "cch".to_string(),
            protoc: "./grpc/cmake/build/third_party/protobuf/protoc \
                     --plugin=protoc-gen-grpc=grpc/cmake/build/grpc_cpp_plugin"
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlagsConfig {
    /// C++ standard (`-std=`).
    pub std: String,

    /// C standard (`-std=`).
    pub cstd: String,

    /// Optimization level (`-O`).
    pub optimization: String,

    /// Lead `CXXFLAGS` with `-g`.
    pub debug_info: bool,

    /// Extra C flags, after the standard and optimization level.
    pub cflags: Vec<String>,

    /// Extra C++ flags, after the standard and optimization level.
    pub cxxflags: Vec<String>,
}

impl Default for FlagsConfig {
    fn default() -> Self {
        Self {
            std: "c++11".to_string(),
            cstd: "c11".to_string(),
            optimization: "2".to_string(),
            debug_info: true,
            cflags: ["-Wall", "-Wextra", "-Werror"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            cxxflags: [
                "-Wall",
                "-Wextra",
                "-Werror",
                "-Wno-unused-parameter",
                "-Wno-sign-compare",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtobufConfig {
    pub includes: String,
    pub libs: String,
}

impl Default for ProtobufConfig {
    fn default() -> Self {
        Self {
            includes: "-Igrpc/include/ -Igrpc/third_party/protobuf/src/".to_string(),
            libs: "-Lgrpc/cmake/build/ -lprotobuf \
                   $(shell PKG_CONFIG_PATH=grpc/cmake/build/libs/opt/pkgconfig/ \
                   pkg-config --libs-only-l grpc++_unsecure) \
                   -lupb -lcares -lz -laddress_sorting"
                .to_string(),
        }
    }
}

impl BuildConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| BuildError::ReadConfig {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        let config: BuildConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Value of the `CFLAGS` variable.
    pub fn cflags(&self) -> Vec<String> {
        let mut flags = vec![
            format!("-std={}", self.flags.cstd),
            format!("-O{}", self.flags.optimization),
        ];
        flags.extend(self.flags.cflags.iter().cloned());
        flags
    }

    /// Value of the `CXXFLAGS` variable.
    pub fn cxxflags(&self) -> Vec<String> {
        let mut flags = Vec::new();
        if self.flags.debug_info {
            flags.push("-g".to_string());
        }
        flags.push(format!("-std={}", self.flags.std));
        flags.push(format!("-O{}", self.flags.optimization));
        flags.extend(self.flags.cxxflags.iter().cloned());
        flags
    }
}

/// Where sources are read from and where build products go.
///
/// Both roots are kept as `/`-separated strings because they are written
/// verbatim into recipes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub src_root: String,
    pub build_root: String,
}

impl Layout {
    pub fn new(src_root: impl Into<String>, build_root: impl Into<String>) -> Self {
        Self {
            src_root: src_root.into(),
            build_root: build_root.into(),
        }
    }

    /// Path of a source-relative name under the source root.
    pub fn src(&self, rel: &str) -> String {
        join(&self.src_root, rel)
    }

    /// Path of a source-relative name under the build root.
    pub fn out(&self, rel: &str) -> String {
        join(&self.build_root, rel)
    }
}

/// Join a root and a relative name with exactly one `/`.
pub fn join(root: &str, rel: &str) -> String {
    if root.is_empty() {
        return rel.to_string();
    }
    if rel.is_empty() {
        return root.to_string();
    }
    format!("{}/{}", root.trim_end_matches('/'), rel)
}

/// Directory part of a `/`-separated path, empty at top level.
pub fn dirname(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(i) => &path[..i],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
[toolchain]
cxx = "clang++"

[flags]
std = "c++20"
optimization = "0"
debug_info = false
cxxflags = ["-fno-rtti"]

[protobuf]
libs = "-lprotobuf"
        "#;

        let config = BuildConfig::from_toml(toml).unwrap();

        assert_eq!(config.toolchain.cxx, "clang++");
        assert_eq!(config.toolchain.cc, "gcc");
        assert_eq!(config.flags.std, "c++20");
        assert_eq!(config.flags.cstd, "c11");
        assert_eq!(config.cxxflags(), vec!["-std=c++20", "-O0", "-fno-rtti"]);
        assert_eq!(config.protobuf.libs, "-lprotobuf");
        assert_eq!(config.protobuf.includes, ProtobufConfig::default().includes);
    }

    #[test]
    fn test_empty_config_is_default() {
        let config = BuildConfig::from_toml("").unwrap();
        assert_eq!(config, BuildConfig::default());
        assert_eq!(
            config.cflags(),
            vec!["-std=c11", "-O2", "-Wall", "-Wextra", "-Werror"]
        );
        assert_eq!(
            config.cxxflags().join(" "),
            "-g -std=c++11 -O2 -Wall -Wextra -Werror -Wno-unused-parameter -Wno-sign-compare"
        );
    }

    #[test]
    fn test_unknown_type_rejected() {
        let err = BuildConfig::from_toml("[flags]\noptimization = 3\n").unwrap_err();
        assert!(matches!(err, crate::BuildError::ParseToml(_)));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mkgen.toml");
        std::fs::write(&path, "[toolchain]\ncc = \"clang\"\n").unwrap();

        let config = BuildConfig::from_file(&path).unwrap();
        assert_eq!(config.toolchain.cc, "clang");
    }

    #[test]
    fn test_missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let err = BuildConfig::from_file(&path).unwrap_err();
        assert!(matches!(&err, BuildError::ReadConfig { path: p, .. } if p.ends_with("absent.toml")));
        assert!(err.to_string().starts_with("Failed to read config file "));
    }

    #[test]
    fn test_layout_paths() {
        let layout = Layout::new("src/", "build");
        assert_eq!(layout.src("a/b.cc"), "src/a/b.cc");
        assert_eq!(layout.out("a/b.o"), "build/a/b.o");
        assert_eq!(layout.out(""), "build");
        assert_eq!(join("", "x.h"), "x.h");
    }

    #[test]
    fn test_dirname() {
        assert_eq!(dirname("build/a/b.o"), "build/a");
        assert_eq!(dirname("b.o"), "");
    }
}
