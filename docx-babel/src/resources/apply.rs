use super::{ResolvedResource, ResourceContent, ResourceId};
use crate::mdast::{Node, Root};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::collections::HashMap;

/// How binary resource content is referenced from the document.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AssetPolicy {
    /// Inline the bytes as a `data:` URI.
    #[default]
    Embed,
    /// Link to files already written next to the document, by resource id.
    Linked(HashMap<ResourceId, String>),
}

/// Write resolved URLs into the image and link nodes they belong to.
///
/// Nodes whose resource resolved to nothing keep their empty URL.
pub fn apply_resolved(root: &mut Root, resolved: &[ResolvedResource], policy: &AssetPolicy) {
    let urls: HashMap<ResourceId, String> = resolved
        .iter()
        .filter_map(|r| {
            let content = r.content.as_ref()?;
            resource_url(r.id, content, policy).map(|url| (r.id, url))
        })
        .collect();

    root.for_each_mut(&mut |node| match node {
        Node::Image {
            url,
            resource: Some(id),
            ..
        }
        | Node::Link {
            url,
            resource: Some(id),
            ..
        } => {
            if let Some(resolved_url) = urls.get(&*id) {
                *url = resolved_url.clone();
            }
        }
        _ => {}
    });
}

fn resource_url(id: ResourceId, content: &ResourceContent, policy: &AssetPolicy) -> Option<String> {
    match (content, policy) {
        (ResourceContent::Sources { src, .. }, _) => Some(src.clone()),
        (ResourceContent::Binary { bytes, mime }, AssetPolicy::Embed) => {
            Some(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
        }
        (ResourceContent::Binary { .. }, AssetPolicy::Linked(paths)) => paths.get(&id).cloned(),
    }
}
