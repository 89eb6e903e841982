//! Upload handling for `POST /api/filehandler/{subpath}`.

use crate::AppState;
use crate::errors::{Error, Result};
use axum::extract::{Multipart, Path, State};
use std::path::{Component, Path as FsPath, PathBuf};
use tokio::fs;

/// Store the multipart `file` field at the subpath named by the request URL.
///
/// The subpath is the remainder of the URL after the upload prefix; when it is
/// empty or ends in `/`, the client-supplied original filename is appended. The
/// resolved destination must stay within the storage root. An existing file at
/// the destination is overwritten.
///
/// The whole upload is buffered in memory (bounded by the configured maximum
/// upload size) before anything touches the filesystem, so a rejected upload
/// never creates or modifies a file. A copy that fails partway through leaves
/// the partial file in place; there is no rollback.
pub async fn upload_file(
    State(state): State<AppState>,
    subpath: Option<Path<String>>,
    mut multipart: Multipart,
) -> Result<String> {
    let max_upload_size = state.config.max_upload_size;

    // Pull out the single meaningful field. Anything else in the form is ignored.
    let mut upload: Option<(Option<String>, Vec<u8>)> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|err| Error::bad_request(format!("failed to parse multipart body: {err}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().map(str::to_owned);
        let mut data = Vec::new();

        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|err| Error::bad_request(format!("failed to read upload body: {err}")))?
        {
            if (data.len() + chunk.len()) as u64 > max_upload_size {
                return Err(Error::bad_request("Maximum file size exceeded"));
            }

            data.extend_from_slice(&chunk);
        }

        upload = Some((file_name, data));
        break;
    }

    let Some((file_name, data)) = upload else {
        return Err(Error::bad_request("missing multipart field `file`"));
    };

    let subpath = subpath.map(|Path(subpath)| subpath).unwrap_or_default();

    // An empty subpath or one naming a directory takes the client's original
    // filename as the final path component.
    let relative = if subpath.is_empty() || subpath.ends_with('/') {
        let name = file_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| Error::bad_request("upload is missing a filename"))?;

        format!("{subpath}{name}")
    } else {
        subpath
    };

    let destination = resolve_within_root(&state.config.storage_dir, &relative)?;

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).await.map_err(|source| Error::Storage {
            path: destination.clone(),
            source,
        })?;
    }

    fs::write(&destination, &data).await.map_err(|source| Error::Storage {
        path: destination.clone(),
        source,
    })?;

    tracing::info!(path = %destination.display(), "file uploaded");

    let display_name = match file_name {
        Some(name) if !name.is_empty() => name,
        _ => destination
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };

    Ok(format!("File {display_name} uploaded successfully"))
}

/// Lexically normalize `relative` and join it to `root`.
///
/// `.` components are dropped and `..` pops the previous component. A path that
/// would climb above the root, or that carries an absolute component, is
/// rejected rather than silently clamped.
fn resolve_within_root(root: &FsPath, relative: &str) -> Result<PathBuf> {
    let mut resolved = PathBuf::new();

    for component in FsPath::new(relative).components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if !resolved.pop() {
                    return Err(Error::bad_request("path escapes the storage root"));
                }
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(Error::bad_request("absolute paths are not allowed"));
            }
        }
    }

    if resolved.as_os_str().is_empty() {
        return Err(Error::bad_request("destination path is empty"));
    }

    Ok(root.join(resolved))
}
