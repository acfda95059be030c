use super::*;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

pub(crate) const TO_RENDER_CLASS: &str = "to_render";

/// Host decompression capability for embeds the generator compressed.
///
/// A viewer without one falls back to asking the user to download the
/// embed.
pub trait Decompressor {
    fn decompress(&self, data: &[u8]) -> std::io::Result<Vec<u8>>;
}

impl<F> Decompressor for F
where
    F: Fn(&[u8]) -> std::io::Result<Vec<u8>>,
{
    fn decompress(&self, data: &[u8]) -> std::io::Result<Vec<u8>> {
        self(data)
    }
}

impl Viewer {
    /// Queues every `span.to_render` for decoding, or replaces it with a
    /// fallback message when it cannot be shown.
    pub(crate) fn schedule_embed_renders(&mut self) -> Result<()> {
        for node in self.dom.elements_by_class(TO_RENDER_CLASS) {
            let show = self.dom.attr(node, "show").as_deref() != Some("false");
            let compressed = self.dom.attr(node, "compressed").as_deref() == Some("true");
            let data = self.dom.attr(node, "data").unwrap_or_default();

            if !show {
                let message = self.config.too_large_message.clone();
                self.finish_render(node, &message, false)?;
                self.trace_line(format!("[embed] {} too large", self.dom.node_label(node)));
                continue;
            }
            if compressed && self.decompressor.is_none() {
                let message = self.config.unsupported_message.clone();
                self.finish_render(node, &message, false)?;
                self.trace_line(format!(
                    "[embed] {} needs decompression, none available",
                    self.dom.node_label(node)
                ));
                continue;
            }

            let target_id = match self.dom.attr(node, "id").filter(|id| !id.is_empty()) {
                Some(id) => id,
                None => {
                    let mut id = self.scheduler.allocate_render_id();
                    while self.dom.by_id(&id).is_some() {
                        id = self.scheduler.allocate_render_id();
                    }
                    self.dom.set_attr(node, "id", &id)?;
                    id
                }
            };
            let placeholder = self.config.loading_placeholder.clone();
            self.dom.set_text_content(node, &placeholder)?;
            self.trace_line(format!("[embed] queued {target_id} compressed={compressed}"));
            self.scheduler.render_queue.push_back(PendingRender {
                target_id,
                data,
                compressed,
            });
        }
        Ok(())
    }

    /// Completes one queued render. The result goes to whatever element
    /// carries the stored id at this point.
    pub(crate) fn complete_render(&mut self, task: PendingRender) -> Result<()> {
        let Some(node) = self.dom.by_id(&task.target_id) else {
            log::debug!(
                target: "behave_report_viewer",
                "render target {} is gone, dropping result",
                task.target_id
            );
            self.trace_line(format!("[embed] dropped {} target missing", task.target_id));
            return Ok(());
        };

        match self.decode_payload(&task) {
            Ok(html) => {
                self.finish_render(node, &html, true)?;
                self.trace_line(format!("[embed] rendered {}", task.target_id));
            }
            Err(reason) => {
                log::warn!(
                    target: "behave_report_viewer",
                    "embed {} could not be decoded: {reason}",
                    task.target_id
                );
                let message = self.config.decode_failed_message.clone();
                self.finish_render(node, &message, false)?;
                self.trace_line(format!("[embed] failed {} {reason}", task.target_id));
            }
        }
        Ok(())
    }

    fn decode_payload(&self, task: &PendingRender) -> std::result::Result<String, String> {
        let bytes = STANDARD
            .decode(task.data.trim())
            .map_err(|err| format!("invalid base64: {err}"))?;
        let bytes = if task.compressed {
            let decompressor = self
                .decompressor
                .as_ref()
                .ok_or_else(|| "no decompressor".to_string())?;
            decompressor
                .decompress(&bytes)
                .map_err(|err| format!("decompression failed: {err}"))?
        } else {
            bytes
        };
        String::from_utf8(bytes).map_err(|err| format!("invalid utf-8: {err}"))
    }

    fn finish_render(&mut self, node: NodeId, content: &str, as_html: bool) -> Result<()> {
        if as_html {
            self.dom.set_inner_html(node, content)?;
        } else {
            self.dom.set_text_content(node, content)?;
        }
        self.dom.class_remove(node, TO_RENDER_CLASS)
    }

    pub(crate) fn download_embed_by_id(&mut self, id: &str, filename: &str) -> Result<()> {
        let Some(embed) = self.dom.by_id(id) else {
            self.trace_line(format!("[embed] download skipped: no element {id}"));
            return Ok(());
        };
        let Some(child) = self.dom.element_children(embed).get(1).copied() else {
            self.trace_line(format!("[embed] download skipped: {id} has no content"));
            return Ok(());
        };

        let tag = self.dom.tag_name(child).unwrap_or_default().to_string();
        let artifact = match tag.as_str() {
            "span" if self.dom.attr(child, "data").is_some() => {
                let data = self.dom.attr(child, "data").unwrap_or_default();
                if self.dom.attr(child, "compressed").as_deref() == Some("true") {
                    DownloadArtifact {
                        filename: format!("{filename}.html.gz"),
                        href: format!("data:application/gzip;base64,{data}"),
                    }
                } else {
                    DownloadArtifact {
                        filename: format!("{filename}.html"),
                        href: format!("data:text/html;base64,{data}"),
                    }
                }
            }
            "span" => DownloadArtifact {
                filename: format!("{filename}.txt"),
                href: format!(
                    "data:text/plain,{}",
                    encode_uri_component(&self.dom.text_content(child))
                ),
            },
            "video" => {
                let source = self.dom.element_children(child).first().copied();
                DownloadArtifact {
                    filename: format!("{filename}.webm"),
                    href: source
                        .and_then(|source| self.dom.attr(source, "src"))
                        .unwrap_or_default(),
                }
            }
            "img" => DownloadArtifact {
                filename: format!("{filename}.png"),
                href: self.dom.attr(child, "src").unwrap_or_default(),
            },
            _ => DownloadArtifact {
                filename: format!("{filename}.html"),
                href: decode_html_entities(&self.dom.inner_html(child)?),
            },
        };

        self.trace_line(format!("[embed] download {}", artifact.filename));
        self.downloads.push(artifact);
        Ok(())
    }
}
