//! The decompressor under test.
//!
//! [`Subject`] is the seam the harness talks through; [`ProcessSubject`] is the
//! real implementation, running `<binary> -d` once per call with the input on
//! stdin and collecting stdout. Tests substitute in-process fakes.

use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

use crate::config::DECOMPRESS_FLAG;
use crate::displaylevel;
use crate::error::HarnessError;

/// Build flavour of the subject binary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BinaryVariant {
    Debug,
    #[default]
    Release,
}

impl BinaryVariant {
    /// Maps the boolean "debug" selector onto a variant.
    pub fn from_debug_flag(debug: bool) -> Self {
        if debug {
            BinaryVariant::Debug
        } else {
            BinaryVariant::Release
        }
    }

    /// Name of the cargo profile directory holding this variant.
    pub fn profile_dir(self) -> &'static str {
        match self {
            BinaryVariant::Debug => "debug",
            BinaryVariant::Release => "release",
        }
    }
}

impl fmt::Display for BinaryVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.profile_dir())
    }
}

/// Filesystem locations of both subject builds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectPaths {
    pub debug: PathBuf,
    pub release: PathBuf,
}

impl SubjectPaths {
    /// `<target_dir>/debug/<name>` and `<target_dir>/release/<name>`.
    pub fn in_target_dir(target_dir: &Path, name: &str) -> Self {
        let exe = format!("{}{}", name, std::env::consts::EXE_SUFFIX);
        Self {
            debug: target_dir.join(BinaryVariant::Debug.profile_dir()).join(&exe),
            release: target_dir.join(BinaryVariant::Release.profile_dir()).join(&exe),
        }
    }

    /// Both variants pointing at the same executable.
    pub fn single(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            debug: path.clone(),
            release: path,
        }
    }

    pub fn resolve(&self, variant: BinaryVariant) -> &Path {
        match variant {
            BinaryVariant::Debug => &self.debug,
            BinaryVariant::Release => &self.release,
        }
    }
}

/// Something that decompresses a gzip payload the way the tool under test does.
pub trait Subject {
    /// Decompress `input` using the given build variant.
    ///
    /// Fails with [`HarnessError::SubjectCrashed`] when the tool reports an
    /// error and [`HarnessError::SubjectIo`] when it cannot be driven at all.
    fn decompress(&self, input: &[u8], variant: BinaryVariant) -> Result<Vec<u8>, HarnessError>;
}

impl<S: Subject + ?Sized> Subject for &S {
    fn decompress(&self, input: &[u8], variant: BinaryVariant) -> Result<Vec<u8>, HarnessError> {
        (**self).decompress(input, variant)
    }
}

/// Runs the subject executable as a child process.
#[derive(Debug, Clone)]
pub struct ProcessSubject {
    paths: SubjectPaths,
}

impl ProcessSubject {
    pub fn new(paths: SubjectPaths) -> Self {
        Self { paths }
    }
}

impl Subject for ProcessSubject {
    fn decompress(&self, input: &[u8], variant: BinaryVariant) -> Result<Vec<u8>, HarnessError> {
        let path = self.paths.resolve(variant);
        let io_err = |source: io::Error| HarnessError::SubjectIo {
            path: path.to_path_buf(),
            source,
        };

        displaylevel!(4, "running {} {} ({} input bytes)\n", path.display(), DECOMPRESS_FLAG, input.len());

        let mut child = Command::new(path)
            .arg(DECOMPRESS_FLAG)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(io_err)?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| io_err(io::Error::other("child stdin was not captured")))?;

        // stdin is fed from a scoped thread while this one drains stdout and
        // stderr; dropping `stdin` at the end of the writer closes the pipe.
        let (output, written) = thread::scope(|scope| {
            let writer = scope.spawn(move || stdin.write_all(input));
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked")));
            (output, written)
        });

        let output = output.map_err(io_err)?;
        if !output.status.success() {
            return Err(HarnessError::SubjectCrashed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        match written {
            // The subject stopped reading; its output is judged as is.
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {}
            Err(e) => return Err(io_err(e)),
            Ok(()) => {}
        }
        Ok(output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_variant_is_release() {
        assert_eq!(BinaryVariant::default(), BinaryVariant::Release);
        assert_eq!(BinaryVariant::from_debug_flag(false), BinaryVariant::Release);
        assert_eq!(BinaryVariant::from_debug_flag(true), BinaryVariant::Debug);
    }

    #[test]
    fn paths_follow_profile_layout() {
        let paths = SubjectPaths::in_target_dir(Path::new("/work/target"), "ripgzip");
        let exe = format!("ripgzip{}", std::env::consts::EXE_SUFFIX);
        assert_eq!(paths.resolve(BinaryVariant::Debug), Path::new("/work/target/debug").join(&exe));
        assert_eq!(paths.resolve(BinaryVariant::Release), Path::new("/work/target/release").join(&exe));
    }

    #[test]
    fn single_path_serves_both_variants() {
        let paths = SubjectPaths::single("/bin/x");
        assert_eq!(paths.resolve(BinaryVariant::Debug), paths.resolve(BinaryVariant::Release));
    }

    #[test]
    fn missing_binary_is_io_failure() {
        let subject = ProcessSubject::new(SubjectPaths::single("/definitely/not/here/ripgzip"));
        let err = subject.decompress(b"", BinaryVariant::Release).unwrap_err();
        match err {
            HarnessError::SubjectIo { path, .. } => {
                assert_eq!(path, Path::new("/definitely/not/here/ripgzip"));
            }
            other => panic!("expected SubjectIo, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_is_a_crash() {
        // `false` ignores its arguments and exits 1.
        let subject = ProcessSubject::new(SubjectPaths::single("false"));
        let err = subject.decompress(b"payload", BinaryVariant::Release).unwrap_err();
        assert!(matches!(err, HarnessError::SubjectCrashed { code: Some(1), .. }), "{err:?}");
    }
}
