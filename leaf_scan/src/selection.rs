use image::ImageFormat;
use std::{
    fs, io,
    path::{Path, PathBuf},
    time::SystemTime,
};
use thiserror::Error;

use crate::config::CameraConfig;

#[derive(Error, Debug)]
pub enum SelectionError {
    #[error("No image selected.")]
    Cancelled,
    #[error("Image not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Permission denied while reading {}", .0.display())]
    PermissionDenied(PathBuf),
    #[error("Unsupported image format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
    #[error("Failed to read {path}: {source}", path = .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SelectionError {
    fn from_io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => SelectionError::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => {
                SelectionError::PermissionDenied(path.to_path_buf())
            }
            _ => SelectionError::Io {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    Gallery(PathBuf),
    Camera,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageReference {
    path: PathBuf,
    file_name: String,
    mime_type: &'static str,
}

impl ImageReference {
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self, SelectionError> {
        let path = path.into();
        let format = ImageFormat::from_path(&path)
            .map_err(|_| SelectionError::UnsupportedFormat(path.clone()))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| SelectionError::UnsupportedFormat(path.clone()))?;

        Ok(Self {
            path,
            file_name,
            mime_type: format.to_mime_type(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    pub async fn read_bytes(&self) -> Result<Vec<u8>, SelectionError> {
        tokio::fs::read(&self.path)
            .await
            .map_err(|e| SelectionError::from_io(&self.path, e))
    }
}

pub trait ImagePicker {
    fn pick(&self, source: &ImageSource) -> Result<ImageReference, SelectionError>;
}

#[derive(Debug, Clone)]
pub struct FsImagePicker {
    capture_dir: PathBuf,
}

impl FsImagePicker {
    pub fn new(camera_config: &CameraConfig) -> Self {
        Self {
            capture_dir: camera_config.capture_dir.clone(),
        }
    }

    fn pick_file(path: &Path) -> Result<ImageReference, SelectionError> {
        let metadata = fs::metadata(path).map_err(|e| SelectionError::from_io(path, e))?;
        if !metadata.is_file() {
            return Err(SelectionError::UnsupportedFormat(path.to_path_buf()));
        }
        ImageReference::from_path(path)
    }

    fn latest_capture(&self) -> Result<ImageReference, SelectionError> {
        let entries = fs::read_dir(&self.capture_dir)
            .map_err(|e| SelectionError::from_io(&self.capture_dir, e))?;

        let mut latest: Option<(SystemTime, ImageReference)> = None;
        for entry in entries {
            let entry = entry.map_err(|e| SelectionError::from_io(&self.capture_dir, e))?;
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }
            let Ok(reference) = ImageReference::from_path(entry.path()) else {
                continue;
            };
            let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            if latest.as_ref().map_or(true, |(seen, _)| modified > *seen) {
                latest = Some((modified, reference));
            }
        }

        latest
            .map(|(_, reference)| reference)
            .ok_or(SelectionError::Cancelled)
    }
}

impl ImagePicker for FsImagePicker {
    fn pick(&self, source: &ImageSource) -> Result<ImageReference, SelectionError> {
        match source {
            ImageSource::Gallery(path) => Self::pick_file(path),
            ImageSource::Camera => self.latest_capture(),
        }
    }
}

pub struct SelectionController<P: ImagePicker> {
    picker: P,
    current: Option<ImageReference>,
}

impl<P: ImagePicker> SelectionController<P> {
    pub fn new(picker: P) -> Self {
        Self {
            picker,
            current: None,
        }
    }

    pub fn select_image(
        &mut self,
        source: &ImageSource,
    ) -> Result<&ImageReference, SelectionError> {
        let reference = self.picker.pick(source)?;
        tracing::info!(
            path = %reference.path().display(),
            mime_type = reference.mime_type(),
            "image selected"
        );
        Ok(&*self.current.insert(reference))
    }

    pub fn current(&self) -> Option<&ImageReference> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs::File, io::Write, thread::sleep, time::Duration};

    fn write_file(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(b"fake image bytes").unwrap();
        path
    }

    fn picker_for(dir: &Path) -> FsImagePicker {
        FsImagePicker::new(&CameraConfig {
            capture_dir: dir.to_path_buf(),
        })
    }

    #[test]
    fn test_gallery_pick_detects_mime_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "leaf.jpg");

        let reference = picker_for(dir.path())
            .pick(&ImageSource::Gallery(path.clone()))
            .unwrap();

        assert_eq!(reference.path(), path.as_path());
        assert_eq!(reference.file_name(), "leaf.jpg");
        assert_eq!(reference.mime_type(), "image/jpeg");
    }

    #[test]
    fn test_gallery_pick_errors() {
        let dir = tempfile::tempdir().unwrap();
        let picker = picker_for(dir.path());
        let notes = write_file(dir.path(), "notes.txt");

        assert!(matches!(
            picker.pick(&ImageSource::Gallery(dir.path().join("missing.png"))),
            Err(SelectionError::NotFound(_))
        ));
        assert!(matches!(
            picker.pick(&ImageSource::Gallery(notes)),
            Err(SelectionError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            picker.pick(&ImageSource::Gallery(dir.path().to_path_buf())),
            Err(SelectionError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_camera_pick_takes_newest_capture() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "older.png");
        write_file(dir.path(), "ignored.txt");
        sleep(Duration::from_millis(50));
        write_file(dir.path(), "newer.jpg");

        let reference = picker_for(dir.path()).pick(&ImageSource::Camera).unwrap();
        assert_eq!(reference.file_name(), "newer.jpg");
    }

    #[test]
    fn test_camera_pick_on_empty_roll_is_cancelled() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            picker_for(dir.path()).pick(&ImageSource::Camera),
            Err(SelectionError::Cancelled)
        ));
    }

    #[test]
    fn test_failed_selection_keeps_previous_image() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_file(dir.path(), "first.png");
        let mut controller = SelectionController::new(picker_for(dir.path()));

        controller
            .select_image(&ImageSource::Gallery(first.clone()))
            .unwrap();
        assert!(controller
            .select_image(&ImageSource::Gallery(dir.path().join("nope.png")))
            .is_err());

        assert_eq!(controller.current().unwrap().path(), first.as_path());
    }

    #[tokio::test]
    async fn test_read_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "leaf.png");
        let reference = ImageReference::from_path(path).unwrap();

        assert_eq!(reference.read_bytes().await.unwrap(), b"fake image bytes");
    }
}
