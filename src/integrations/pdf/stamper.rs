// src/integrations/pdf/stamper.rs
//
// PDF Page Compositor - draws the QR image onto page 1 with `lopdf`
//
// CRITICAL RULES:
// - Placement is given from the top-left corner of the page; PDF user space
//   starts bottom-left, so the rectangle is flipped against the MediaBox
// - The image is scaled to fit the rectangle, centred, aspect preserved
// - The file is replaced atomically: write a sibling temp file, then persist
// - Resources inherited from the page tree stay visible on the stamped page

use std::path::Path;

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use tempfile::NamedTempFile;

use crate::config::QrPlacement;
use crate::integrations::{IntegrationError, IntegrationResult, PageCompositor, QrImage};

/// Resource name of the stamped image
const XOBJECT_NAME: &str = "QrLink";

/// MediaBox lookups follow at most this many Parent links
const MAX_TREE_DEPTH: usize = 32;

#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfCompositor;

impl LopdfCompositor {
    fn number(object: &Object) -> Option<f32> {
        match object {
            Object::Integer(value) => Some(*value as f32),
            Object::Real(value) => Some(*value as f32),
            _ => None,
        }
    }

    fn resolve<'a>(doc: &'a Document, object: &'a Object) -> IntegrationResult<&'a Object> {
        match object {
            Object::Reference(id) => Ok(doc.get_object(*id)?),
            other => Ok(other),
        }
    }

    /// Page attribute looked up on the page, then up the `Parent` chain
    fn inherited<'a>(
        doc: &'a Document,
        page_id: ObjectId,
        key: &[u8],
    ) -> IntegrationResult<Option<&'a Object>> {
        let mut node_id = page_id;

        for _ in 0..MAX_TREE_DEPTH {
            let node = doc.get_object(node_id)?.as_dict()?;

            if let Ok(entry) = node.get(key) {
                return Ok(Some(Self::resolve(doc, entry)?));
            }

            match node.get(b"Parent") {
                Ok(parent) => node_id = parent.as_reference()?,
                Err(_) => return Ok(None),
            }
        }

        Err(IntegrationError::PdfStructure(format!(
            "Page tree above {:?} is deeper than {}",
            page_id, MAX_TREE_DEPTH
        )))
    }

    /// MediaBox of a page as [llx, lly, urx, ury], inherited from the page tree if needed
    fn media_box(doc: &Document, page_id: ObjectId) -> IntegrationResult<[f32; 4]> {
        let entry = Self::inherited(doc, page_id, b"MediaBox")?.ok_or_else(|| {
            IntegrationError::PdfStructure(format!("No MediaBox found for page {:?}", page_id))
        })?;

        let numbers: Vec<f32> = entry
            .as_array()?
            .iter()
            .filter_map(|value| Self::resolve(doc, value).ok().and_then(Self::number))
            .collect();

        match numbers.as_slice() {
            [llx, lly, urx, ury] => Ok([*llx, *lly, *urx, *ury]),
            _ => Err(IntegrationError::PdfStructure(format!(
                "MediaBox of page {:?} is not four numbers",
                page_id
            ))),
        }
    }

    /// Give the page its own copy of inherited Resources.
    /// lopdf adds an empty dictionary otherwise, hiding the inherited fonts.
    fn own_resources(doc: &mut Document, page_id: ObjectId) -> IntegrationResult<()> {
        if doc.get_object(page_id)?.as_dict()?.has(b"Resources") {
            return Ok(());
        }

        let resources = match Self::inherited(doc, page_id, b"Resources")? {
            Some(inherited) => inherited.as_dict()?.clone(),
            None => Dictionary::new(),
        };

        doc.get_object_mut(page_id)?
            .as_dict_mut()?
            .set("Resources", Object::Dictionary(resources));
        Ok(())
    }

    fn has_xobject(doc: &Document, page_id: ObjectId, name: &str) -> IntegrationResult<bool> {
        let page = doc.get_object(page_id)?.as_dict()?;
        let resources = Self::resolve(doc, page.get(b"Resources")?)?.as_dict()?;
        let found = match resources.get(b"XObject") {
            Ok(xobjects) => Self::resolve(doc, xobjects)?.as_dict()?.has(name.as_bytes()),
            Err(_) => false,
        };
        Ok(found)
    }

    /// `cm` operands drawing a square image inside `placement`
    fn image_matrix(media_box: [f32; 4], placement: &QrPlacement) -> [f32; 3] {
        let [llx, _, _, ury] = media_box;
        let side = placement.width().min(placement.height());

        let x = llx + placement.left + (placement.width() - side) / 2.0;
        let y = ury - placement.bottom + (placement.height() - side) / 2.0;

        [side, x, y]
    }

    fn image_stream(image: &QrImage) -> Stream {
        let side = i64::from(image.side);
        Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => side,
                "Height" => side,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            image.pixels.clone(),
        )
    }
}

impl PageCompositor for LopdfCompositor {
    fn overlay_first_page(
        &self,
        pdf: &Path,
        image: &QrImage,
        placement: &QrPlacement,
    ) -> IntegrationResult<()> {
        if !placement.is_valid() {
            return Err(IntegrationError::PdfStructure(format!(
                "Empty placement rectangle {:?}",
                placement
            )));
        }

        let mut doc = Document::load(pdf)?;

        let page_id = doc
            .get_pages()
            .get(&1)
            .copied()
            .ok_or_else(|| IntegrationError::PdfStructure("Document has no pages".to_string()))?;

        let [side, x, y] = Self::image_matrix(Self::media_box(&doc, page_id)?, placement);

        let image_id = doc.add_object(Self::image_stream(image));
        Self::own_resources(&mut doc, page_id)?;
        doc.add_xobject(page_id, XOBJECT_NAME, image_id)?;
        if !Self::has_xobject(&doc, page_id, XOBJECT_NAME)? {
            return Err(IntegrationError::PdfStructure(format!(
                "Page resources of {:?} did not accept the QR image",
                pdf
            )));
        }

        let content = format!(
            "q\n{:.2} 0 0 {:.2} {:.2} {:.2} cm\n/{} Do\nQ\n",
            side, side, x, y, XOBJECT_NAME
        );
        doc.add_page_contents(page_id, content.into_bytes())?;

        let directory = pdf.parent().unwrap_or_else(|| Path::new("."));
        let mut staged = NamedTempFile::new_in(directory)?;
        doc.save_to(staged.as_file_mut())?;
        staged.persist(pdf).map_err(|e| e.error)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// One-page PDF whose MediaBox lives on the Pages node, not the page
    fn write_inherited_media_box_pdf(path: &Path) {
        write_inherited_pdf(path, None);
    }

    /// Like above, with an optional Resources dictionary on the Pages node too
    fn write_inherited_pdf(path: &Path, pages_resources: Option<Dictionary>) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            b"BT /F1 24 Tf 100 100 Td (Grid) Tj ET".to_vec(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        let mut pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "MediaBox" => vec![0.into(), 0.into(), 1700.into(), 2600.into()],
        };
        if let Some(resources) = pages_resources {
            pages.set("Resources", Object::Dictionary(resources));
        }
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    fn white(side: u32) -> QrImage {
        QrImage::new(side, vec![255; (side * side) as usize]).unwrap()
    }

    #[test]
    fn test_image_matrix_flips_and_centres() {
        let placement = QrPlacement {
            left: 100.0,
            top: 100.0,
            right: 300.0,
            bottom: 200.0,
        };
        let [side, x, y] = LopdfCompositor::image_matrix([0.0, 0.0, 1000.0, 1000.0], &placement);

        assert_eq!(side, 100.0);
        assert_eq!(x, 150.0);
        assert_eq!(y, 800.0);
    }

    #[test]
    fn test_overlay_with_inherited_media_box() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("poster.pdf");
        write_inherited_media_box_pdf(&path);

        LopdfCompositor
            .overlay_first_page(&path, &white(120), &QrPlacement::default())
            .unwrap();

        let doc = Document::load(&path).unwrap();
        let page_id = *doc.get_pages().get(&1).unwrap();
        let content = String::from_utf8(doc.get_page_content(page_id).unwrap()).unwrap();

        assert!(content.contains("/QrLink Do"));
        assert!(content.contains("140.00 0 0 140.00 1400.00 45.00 cm"));
    }

    #[test]
    fn test_overlay_keeps_inherited_fonts() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("poster.pdf");
        let font = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        };
        write_inherited_pdf(
            &path,
            Some(dictionary! {
                "Font" => dictionary! { "F1" => font },
            }),
        );

        LopdfCompositor
            .overlay_first_page(&path, &white(120), &QrPlacement::default())
            .unwrap();

        let doc = Document::load(&path).unwrap();
        let page_id = *doc.get_pages().get(&1).unwrap();
        let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
        let resources = LopdfCompositor::resolve(&doc, page.get(b"Resources").unwrap())
            .unwrap()
            .as_dict()
            .unwrap();

        let fonts = LopdfCompositor::resolve(&doc, resources.get(b"Font").unwrap())
            .unwrap()
            .as_dict()
            .unwrap();
        assert!(fonts.has(b"F1"));
        assert!(LopdfCompositor::has_xobject(&doc, page_id, "QrLink").unwrap());
    }

    #[test]
    fn test_not_a_pdf_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"not a pdf").unwrap();

        let result = LopdfCompositor.overlay_first_page(&path, &white(4), &QrPlacement::default());
        assert!(result.is_err());
        assert_eq!(std::fs::read(&path).unwrap(), b"not a pdf");
    }
}
