//! API services over the request executor.

mod about;
mod files;
mod permissions;

pub use about::AboutService;
pub use files::{FilesService, GetFileParams};
pub use permissions::{
    CreatePermissionParams, CreatePermissionRequest, ListPermissionsParams, PermissionsService,
    UpdatePermissionParams, UpdatePermissionRequest,
};

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters escaped when a caller-supplied value lands in a path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'#')
    .add(b'?')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'%');

pub(crate) fn encode_segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}
