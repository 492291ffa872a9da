//! Small in-memory PDFs for tests.

use lopdf::content::{Content, Operation};
use lopdf::encryption::{decrypt_object, get_encryption_key};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};

/// An image XObject to embed in a fixture page.
#[derive(Clone)]
pub(crate) struct FixtureImage {
    dict: Dictionary,
    content: Vec<u8>,
}

impl FixtureImage {
    /// A DCT-encoded image whose stream is a JPEG SOI marker followed by `payload`.
    pub(crate) fn jpeg(payload: &[u8]) -> Self {
        let mut content = vec![0xFF, 0xD8, 0xFF, 0xE0];
        content.extend_from_slice(payload);
        Self {
            dict: dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 8,
                "Height" => 8,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            content,
        }
    }

    /// An uncompressed 8-bit RGB image.
    pub(crate) fn rgb(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            dict: dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width as i64,
                "Height" => height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
            },
            content: pixels,
        }
    }

    fn stream(&self) -> Stream {
        Stream::new(self.dict.clone(), self.content.clone())
    }
}

enum FixtureXObject {
    Image(FixtureImage),
    Form(Vec<FixtureImage>),
}

/// One page: optional text lines and the XObjects listed in its resources.
pub(crate) struct FixturePage {
    text: Option<String>,
    xobjects: Vec<FixtureXObject>,
}

impl FixturePage {
    pub(crate) fn empty() -> Self {
        Self {
            text: None,
            xobjects: Vec::new(),
        }
    }

    /// A page showing `text`, one line per `\n`-separated segment.
    pub(crate) fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            xobjects: Vec::new(),
        }
    }

    pub(crate) fn with_image(mut self, image: FixtureImage) -> Self {
        self.xobjects.push(FixtureXObject::Image(image));
        self
    }

    pub(crate) fn with_form(mut self, images: Vec<FixtureImage>) -> Self {
        self.xobjects.push(FixtureXObject::Form(images));
        self
    }

    fn content(&self) -> Vec<u8> {
        let mut operations = Vec::new();
        if let Some(text) = &self.text {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
            operations.push(Operation::new("TL", vec![14.into()]));
            operations.push(Operation::new("Td", vec![72.into(), 720.into()]));
            for (i, line) in text.split('\n').enumerate() {
                if i > 0 {
                    operations.push(Operation::new("T*", vec![]));
                }
                operations.push(Operation::new("Tj", vec![Object::string_literal(line)]));
            }
            operations.push(Operation::new("ET", vec![]));
        }
        Content { operations }.encode().unwrap()
    }
}

struct FixtureBuilder {
    doc: Document,
    pages_id: ObjectId,
    font_id: ObjectId,
    kids: Vec<Object>,
}

impl FixtureBuilder {
    fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        Self {
            doc,
            pages_id,
            font_id,
            kids: Vec::new(),
        }
    }

    fn add_page(&mut self, page: &FixturePage, extra_xobjects: &[(String, ObjectId)]) {
        let mut xobjects = Dictionary::new();
        for (i, xobject) in page.xobjects.iter().enumerate() {
            let id = match xobject {
                FixtureXObject::Image(image) => self.doc.add_object(image.stream()),
                FixtureXObject::Form(images) => {
                    let mut inner = Dictionary::new();
                    for (j, image) in images.iter().enumerate() {
                        let image_id = self.doc.add_object(image.stream());
                        inner.set(format!("Im{}", j + 1), image_id);
                    }
                    let form = Stream::new(
                        dictionary! {
                            "Type" => "XObject",
                            "Subtype" => "Form",
                            "BBox" => vec![0.into(), 0.into(), 100.into(), 100.into()],
                            "Resources" => dictionary! { "XObject" => inner },
                        },
                        Vec::new(),
                    );
                    self.doc.add_object(form)
                }
            };
            xobjects.set(format!("X{}", i + 1), id);
        }
        for (name, id) in extra_xobjects {
            xobjects.set(name.clone(), *id);
        }

        let resources_id = self.doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => self.font_id },
            "XObject" => xobjects,
        });
        let content_id = self.doc.add_object(Stream::new(dictionary! {}, page.content()));
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        self.kids.push(page_id.into());
    }

    fn finish(self) -> Vec<u8> {
        let mut doc = self.into_document();
        let mut data = Vec::new();
        doc.save_to(&mut data).unwrap();
        data
    }

    fn into_document(mut self) -> Document {
        let count = self.kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => self.kids,
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        self.doc.objects.insert(self.pages_id, Object::Dictionary(pages));
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc
    }
}

/// Serialize the given pages into a PDF.
pub(crate) fn build_pdf(pages: &[FixturePage]) -> Vec<u8> {
    let mut builder = FixtureBuilder::new();
    for page in pages {
        builder.add_page(page, &[]);
    }
    builder.finish()
}

/// A PDF of `page_count` empty pages all referencing one shared JPEG object.
pub(crate) fn build_pdf_with_shared_image(page_count: usize, payload: &[u8]) -> Vec<u8> {
    let mut builder = FixtureBuilder::new();
    let shared_id = builder.doc.add_object(FixtureImage::jpeg(payload).stream());
    for _ in 0..page_count {
        builder.add_page(&FixturePage::empty(), &[("Shared".to_string(), shared_id)]);
    }
    builder.finish()
}

/// Password padding from the standard security handler.
const PASSWORD_PAD: [u8; 32] = [
    0x28, 0xBF, 0x4E, 0x5E, 0x4E, 0x75, 0x8A, 0x41, 0x64, 0x00, 0x4E, 0x56, 0xFF, 0xFA, 0x01, 0x08, 0x2E, 0x2E, 0x00,
    0xB6, 0xD0, 0x68, 0x3E, 0x80, 0x2F, 0x0C, 0xA9, 0xFE, 0x64, 0x53, 0x69, 0x7A,
];

fn rc4(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut state: Vec<u8> = (0..=255).collect();
    let mut j = 0u8;
    for i in 0..256 {
        j = j.wrapping_add(state[i]).wrapping_add(key[i % key.len()]);
        state.swap(i, j as usize);
    }

    let (mut i, mut j) = (0u8, 0u8);
    data.iter()
        .map(|byte| {
            i = i.wrapping_add(1);
            j = j.wrapping_add(state[i as usize]);
            state.swap(i as usize, j as usize);
            byte ^ state[state[i as usize].wrapping_add(state[j as usize]) as usize]
        })
        .collect()
}

/// Serialize the pages into a PDF encrypted with 40-bit RC4 (revision 2)
/// under `user_password`.
pub(crate) fn build_encrypted_pdf(pages: &[FixturePage], user_password: &str) -> Vec<u8> {
    let mut builder = FixtureBuilder::new();
    for page in pages {
        builder.add_page(page, &[]);
    }
    let mut doc = builder.into_document();

    let file_id = Object::string_literal(b"pdf2html-fixture".to_vec());
    doc.trailer.set("ID", vec![file_id.clone(), file_id]);
    let encrypt_id = doc.add_object(dictionary! {
        "Filter" => "Standard",
        "V" => 1,
        "R" => 2,
        "Length" => 40,
        "P" => -4,
        "O" => Object::string_literal(vec![0x55; 32]),
        "CF" => dictionary! { "StdCF" => dictionary! { "CFM" => "V2" } },
    });
    doc.trailer.set("Encrypt", encrypt_id);

    let key = get_encryption_key(&doc, user_password, false).unwrap();
    let user_entry = rc4(&key, &PASSWORD_PAD);
    doc.get_object_mut(encrypt_id)
        .and_then(Object::as_dict_mut)
        .unwrap()
        .set("U", Object::string_literal(user_entry));

    // RC4 is symmetric, so lopdf's object decryption doubles as encryption.
    for (&id, obj) in doc.objects.iter_mut() {
        if id == encrypt_id {
            continue;
        }
        let Ok(encrypted) = decrypt_object(&key, id, &*obj, false) else {
            continue;
        };
        match obj {
            Object::Stream(stream) => stream.set_content(encrypted),
            Object::String(content, _) => *content = encrypted,
            _ => {}
        }
    }

    let mut data = Vec::new();
    doc.save_to(&mut data).unwrap();
    data
}
