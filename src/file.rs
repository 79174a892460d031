use anyhow::{Error, Result};
use mime_guess::{Mime, from_path};
use std::{
    fs::File as FsFile,
    path::{Component, Path, PathBuf},
};
use tiny_http::{Header, Response};

pub struct File {
    pub path: PathBuf,
    pub mime: Mime,
    pub size: u64,
}

/// Outcome of mapping a request URL onto the serving directory.
pub enum Resolved {
    File(File),
    Directory(PathBuf, String),
    Redirect(String),
    NotFound,
}

impl File {
    pub fn new(path: PathBuf) -> Result<Self> {
        let mime = from_path(&path).first_or_octet_stream();
        let metadata = FsFile::open(&path).and_then(|file| file.metadata())?;

        Ok(Self {
            path,
            mime,
            size: metadata.len(),
        })
    }

    pub fn resolve(root: &Path, url: &str) -> Resolved {
        let path = url.split('?').next().unwrap_or_default();

        let Ok(decoded) = urlencoding::decode(path) else {
            return Resolved::NotFound;
        };

        let mut target = root.to_path_buf();

        for component in Path::new(&*decoded).components() {
            match component {
                Component::Normal(segment) => target.push(segment),
                // `..` never escapes the serving directory
                Component::ParentDir => return Resolved::NotFound,
                _ => {}
            }
        }

        if target.is_dir() {
            if !path.ends_with('/') {
                return Resolved::Redirect(format!("{path}/"));
            }

            for index in ["index.html", "index.htm"] {
                let candidate = target.join(index);

                if candidate.is_file() {
                    return match Self::new(candidate) {
                        Ok(file) => Resolved::File(file),
                        Err(_) => Resolved::NotFound,
                    };
                }
            }

            return Resolved::Directory(target, decoded.into_owned());
        }

        if target.is_file() {
            match Self::new(target) {
                Ok(file) => Resolved::File(file),
                Err(_) => Resolved::NotFound,
            }
        } else {
            Resolved::NotFound
        }
    }

    pub fn get_response(&self) -> Result<Response<FsFile>> {
        let fs_file = FsFile::open(&self.path)?;
        let header = Header::from_bytes("content-type", self.mime.essence_str())
            .map_err(|_| Error::msg("Could not create header"))?;
        let response = Response::from_file(fs_file).with_header(header);

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{create_dir, write};
    use tempfile::tempdir;

    #[test]
    fn resolves_file_with_mime_and_size() {
        let root = tempdir().unwrap();
        write(root.path().join("postman_collection.json"), "{}").unwrap();

        let Resolved::File(file) = File::resolve(root.path(), "/postman_collection.json") else {
            panic!("expected a file");
        };

        assert_eq!(file.size, 2);
        assert_eq!(file.mime.essence_str(), "application/json");
    }

    #[test]
    fn resolves_percent_encoded_names() {
        let root = tempdir().unwrap();
        write(root.path().join("release notes.html"), "<html></html>").unwrap();

        let Resolved::File(file) = File::resolve(root.path(), "/release%20notes.html") else {
            panic!("expected a file");
        };

        assert_eq!(file.mime.essence_str(), "text/html");
    }

    #[test]
    fn strips_query_strings() {
        let root = tempdir().unwrap();
        write(root.path().join("spec.json"), "{}").unwrap();

        assert!(matches!(
            File::resolve(root.path(), "/spec.json?version=2"),
            Resolved::File(_)
        ));
    }

    #[test]
    fn missing_paths_are_not_found() {
        let root = tempdir().unwrap();

        assert!(matches!(
            File::resolve(root.path(), "/nope.txt"),
            Resolved::NotFound
        ));
    }

    #[test]
    fn parent_components_are_not_found() {
        let root = tempdir().unwrap();
        let outside = root.path().join("secret.txt");
        write(&outside, "secret").unwrap();

        let serving = root.path().join("docs");
        create_dir(&serving).unwrap();

        assert!(matches!(
            File::resolve(&serving, "/../secret.txt"),
            Resolved::NotFound
        ));
        assert!(matches!(
            File::resolve(&serving, "/%2e%2e/secret.txt"),
            Resolved::NotFound
        ));
    }

    #[test]
    fn directories_without_slash_redirect() {
        let root = tempdir().unwrap();
        create_dir(root.path().join("schemas")).unwrap();

        let Resolved::Redirect(location) = File::resolve(root.path(), "/schemas") else {
            panic!("expected a redirect");
        };

        assert_eq!(location, "/schemas/");
    }

    #[test]
    fn directories_prefer_their_index_file() {
        let root = tempdir().unwrap();
        write(root.path().join("index.html"), "<h1>docs</h1>").unwrap();

        let Resolved::File(file) = File::resolve(root.path(), "/") else {
            panic!("expected the index file");
        };

        assert!(file.path.ends_with("index.html"));
    }

    #[test]
    fn directories_without_index_list() {
        let root = tempdir().unwrap();
        write(root.path().join("a.txt"), "a").unwrap();

        assert!(matches!(
            File::resolve(root.path(), "/"),
            Resolved::Directory(_, _)
        ));
    }
}
