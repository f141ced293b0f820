use base64::engine::general_purpose::STANDARD as BASE64_ENGINE;
use base64::Engine;
use std::path::{Path, PathBuf};

use super::{Alert, SessionView};

/// Below this length a preview source is treated as empty.
const LEGACY_PRESENCE_MIN_LEN: usize = 100;

/// How the file reached the dashboard. All sources share one acceptance path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ImageSource {
    Picker,
    Drop,
    Input,
}

impl ImageSource {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            ImageSource::Picker => "picker",
            ImageSource::Drop => "drop",
            ImageSource::Input => "input",
        }
    }
}

/// A file that passed the MIME check but has not been read yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ImageCandidate {
    path: PathBuf,
    mime: String,
}

impl ImageCandidate {
    pub(crate) fn from_path(path: impl Into<PathBuf>) -> Result<Self, Alert> {
        let path = path.into();
        let mime = mime_for(&path).ok_or(Alert::NotAnImage)?;
        Ok(Self { path, mime })
    }

    pub(crate) async fn load(self) -> anyhow::Result<ImageFile> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|err| {
            anyhow::anyhow!("failed to read image {}: {err}", self.path.display())
        })?;
        Ok(ImageFile {
            name: file_name(&self.path),
            mime: self.mime,
            bytes,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ImageFile {
    pub(crate) name: String,
    pub(crate) mime: String,
    pub(crate) bytes: Vec<u8>,
}

impl ImageFile {
    pub(crate) fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime,
            BASE64_ENGINE.encode(&self.bytes)
        )
    }
}

fn mime_for(path: &Path) -> Option<String> {
    let guess = mime_guess::from_path(path).first()?;
    if guess.type_() != mime_guess::mime::IMAGE {
        return None;
    }
    Some(guess.essence_str().to_string())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ImageSlot {
    pub(crate) preview_src: String,
    pub(crate) file_name: Option<String>,
    pub(crate) attached: bool,
    pub(crate) placeholder_visible: bool,
    pub(crate) preview_visible: bool,
}

impl Default for ImageSlot {
    fn default() -> Self {
        Self {
            preview_src: String::new(),
            file_name: None,
            attached: false,
            placeholder_visible: true,
            preview_visible: false,
        }
    }
}

impl ImageSlot {
    /// The explicit flag decides; a long preview source still counts so that
    /// sources set without going through `accept_image` behave as before.
    pub(crate) fn has_image(&self) -> bool {
        self.attached || self.preview_src.len() > LEGACY_PRESENCE_MIN_LEN
    }
}

/// Checks the file type up front; nothing changes when the file is rejected.
pub(crate) async fn capture_image(
    view: &mut SessionView,
    path: impl Into<PathBuf>,
    source: ImageSource,
) -> Result<(), Alert> {
    let candidate = match ImageCandidate::from_path(path) {
        Ok(candidate) => candidate,
        Err(alert) => {
            view.raise(alert);
            return Err(alert);
        }
    };
    let loaded = candidate.load().await;
    finish_capture(view, loaded, source)
}

/// Second half of a capture whose file was read elsewhere.
pub(crate) fn finish_capture(
    view: &mut SessionView,
    loaded: anyhow::Result<ImageFile>,
    source: ImageSource,
) -> Result<(), Alert> {
    match loaded {
        Ok(file) => {
            accept_image(view, file, source);
            Ok(())
        }
        Err(err) => {
            tracing::warn!(error = %err, "image read failed");
            view.raise(Alert::ImageUnreadable);
            Err(Alert::ImageUnreadable)
        }
    }
}

pub(crate) fn accept_image(view: &mut SessionView, file: ImageFile, source: ImageSource) {
    tracing::info!(
        name = %file.name,
        mime = %file.mime,
        bytes = file.bytes.len(),
        source = source.as_str(),
        "image attached"
    );
    view.image = ImageSlot {
        preview_src: file.data_url(),
        file_name: Some(file.name),
        attached: true,
        placeholder_visible: false,
        preview_visible: true,
    };
    view.form.inputs_visible = false;
}

pub(crate) fn clear_image(view: &mut SessionView) {
    view.image = ImageSlot::default();
    view.form.inputs_visible = true;
}
