use lopdf::{dictionary, Dictionary, Document, Object, Stream};

/// Route library logs to the test output; safe to call from every test
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Build a Letter-size PDF with one page per content stream
pub fn build_pdf(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let kids: Vec<Object> = pages
        .iter()
        .map(|content| {
            let content_id =
                doc.add_object(Stream::new(Dictionary::new(), content.as_bytes().to_vec()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            Object::Reference(page_id)
        })
        .collect();

    // Resources and MediaBox live on the page tree root and are inherited
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => pages.len() as i64,
            "Kids" => kids,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// A two-page form: name line, email label and a checkbox, then a signature line
pub fn sample_form() -> Vec<u8> {
    build_pdf(&[
        concat!(
            "BT /F1 12 Tf 72 700 Td (Name: ___________) Tj ET\n",
            "BT /F1 12 Tf 50 600 Td (Email:) Tj ET\n",
            "BT /F1 12 Tf 200 600 Td ( ) Tj ET\n",
            "BT /F1 12 Tf 72 500 Td ([ ]) Tj ET\n",
            "BT /F1 12 Tf 100 500 Td (I agree to the terms) Tj ET\n",
        ),
        "BT /F1 12 Tf 72 150 Td (Signature:) Tj 200 0 Td ( ) Tj ET\n",
    ])
}
