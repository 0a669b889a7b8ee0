use encoding_rs::Encoding;
use html5ever::serialize::{serialize, SerializeOpts};
use markup5ever_rcdom::{RcDom, SerializableHandle};

/// 序列化文档
///
/// `document_encoding` 非空且可识别时，把结果转换为该编码。
pub fn serialize_document(dom: &RcDom, document_encoding: &str) -> std::io::Result<Vec<u8>> {
    let mut buf: Vec<u8> = Vec::new();

    let serializable: SerializableHandle = dom.document.clone().into();
    serialize(&mut buf, &serializable, SerializeOpts::default())?;

    if !document_encoding.is_empty() {
        if let Some(encoding) = Encoding::for_label(document_encoding.as_bytes()) {
            if encoding != encoding_rs::UTF_8 {
                let s: &str = &String::from_utf8_lossy(&buf);
                let (data, _, _) = encoding.encode(s);
                buf = data.to_vec();
            }
        }
    }

    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::dom::html_to_dom;

    #[test]
    fn serializes_whole_document_with_doctype() {
        let dom = html_to_dom("<!DOCTYPE html><p>x</p>");
        let out = String::from_utf8(serialize_document(&dom, "utf-8").unwrap()).unwrap();
        assert_eq!(
            out,
            "<!DOCTYPE html><html><head></head><body><p>x</p></body></html>"
        );
    }

    #[test]
    fn converts_to_requested_encoding() {
        let dom = html_to_dom("<p>é</p>");
        let out = serialize_document(&dom, "windows-1252").unwrap();
        assert!(out.windows(1).any(|b| b == [0xE9]));
    }
}
