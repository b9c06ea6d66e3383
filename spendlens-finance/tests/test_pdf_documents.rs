//! Statements built in memory with lopdf and run through `analyze_pdf`.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, StringFormat, dictionary};
use md5::{Digest, Md5};
use rust_decimal::Decimal;
use spendlens_core::{AnalysisError, Category, Direction, PipelineConfig, Strategy};
use spendlens_finance::{RunStatus, StatementReport, analyze_pdf};

const COLUMNS: [i64; 4] = [50, 150, 300, 400];

const STATEMENT: &[&[&str]] = &[
    &["Date", "Description", "Amount", "Type"],
    &["12/05/2024", "SWIGGY ORDER", "345.00", "Debit"],
    &["13/05/2024", "Ravi Kumar", "500.00", "Credit"],
    &["14/05/2024", "Uber trip", "180.50", "Debit"],
];

/// One BT/Td/Tj/ET block per cell, as statement generators draw grids.
fn table_stream(rows: &[&[&str]]) -> Stream {
    let mut operations = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        let y = 700 - 20 * i as i64;
        for (text, x) in row.iter().zip(COLUMNS) {
            operations.extend([
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 10.into()]),
                Operation::new("Td", vec![x.into(), y.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ]);
        }
    }
    Stream::new(dictionary! {}, Content { operations }.encode().unwrap())
}

/// One text block, one string per line.
fn text_stream(lines: &[&str]) -> Stream {
    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 10.into()]),
        Operation::new("TL", vec![14.into()]),
        Operation::new("Td", vec![50.into(), 700.into()]),
    ];
    for line in lines {
        operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
        operations.push(Operation::new("T*", vec![]));
    }
    operations.push(Operation::new("ET", vec![]));
    Stream::new(dictionary! {}, Content { operations }.encode().unwrap())
}

/// A content stream behind a filter lopdf cannot decode.
fn undecodable_stream() -> Stream {
    Stream::new(
        dictionary! { "Filter" => "RunLengthDecode" },
        vec![0x02, b'B', b'T', b' ', 0x80],
    )
}

fn document(contents: Vec<Stream>) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });

    let kids: Vec<Object> = contents
        .into_iter()
        .map(|stream| {
            let content_id = doc.add_object(stream);
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Contents" => content_id,
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => font_id },
                },
            })
            .into()
        })
        .collect();

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

fn to_bytes(mut doc: Document) -> Vec<u8> {
    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

const PAD_BYTES: [u8; 32] = [
    0x28, 0xBF, 0x4E, 0x5E, 0x4E, 0x75, 0x8A, 0x41, 0x64, 0x00, 0x4E, 0x56, 0xFF, 0xFA, 0x01,
    0x08, 0x2E, 0x2E, 0x00, 0xB6, 0xD0, 0x68, 0x3E, 0x80, 0x2F, 0x0C, 0xA9, 0xFE, 0x64, 0x53,
    0x69, 0x7A,
];

fn rc4(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut s: Vec<u8> = (0..=255).collect();
    let mut j = 0usize;
    for i in 0..256 {
        j = (j + s[i] as usize + key[i % key.len()] as usize) & 0xFF;
        s.swap(i, j);
    }
    let (mut i, mut j) = (0usize, 0usize);
    data.iter()
        .map(|&byte| {
            i = (i + 1) & 0xFF;
            j = (j + s[i] as usize) & 0xFF;
            s.swap(i, j);
            byte ^ s[(s[i] as usize + s[j] as usize) & 0xFF]
        })
        .collect()
}

/// Standard security handler, revision 2 (40-bit RC4), owner password
/// equal to the user password.
fn encrypt(doc: &mut Document, user_password: &[u8]) {
    let file_id = b"spendlens-test-1".to_vec();
    let permissions: i64 = -4;

    let mut padded = user_password[..user_password.len().min(32)].to_vec();
    padded.extend_from_slice(&PAD_BYTES[..32 - padded.len()]);
    let owner = rc4(&Md5::digest(&padded)[..5], &padded);

    let mut key_input = padded.clone();
    key_input.extend_from_slice(&owner);
    key_input.extend_from_slice(&(permissions as u32).to_le_bytes());
    key_input.extend_from_slice(&file_id);
    let key = Md5::digest(&key_input)[..5].to_vec();
    let user = rc4(&key, &PAD_BYTES);

    for (&(number, generation), obj) in doc.objects.iter_mut() {
        let mut object_key = key.clone();
        object_key.extend_from_slice(&number.to_le_bytes()[..3]);
        object_key.extend_from_slice(&generation.to_le_bytes()[..2]);
        let digest = Md5::digest(&object_key);
        let object_key = &digest[..10];
        match obj {
            Object::Stream(stream) => {
                let sealed = rc4(object_key, &stream.content);
                stream.set_content(sealed);
            }
            Object::String(content, _) => *content = rc4(object_key, content),
            _ => {}
        }
    }

    let encrypt_id: ObjectId = doc.add_object(dictionary! {
        "Filter" => "Standard",
        "V" => 1,
        "R" => 2,
        "Length" => 40,
        "O" => Object::String(owner, StringFormat::Hexadecimal),
        "U" => Object::String(user, StringFormat::Hexadecimal),
        "P" => permissions,
    });
    doc.trailer.set("Encrypt", encrypt_id);
    doc.trailer.set(
        "ID",
        vec![
            Object::String(file_id.clone(), StringFormat::Hexadecimal),
            Object::String(file_id, StringFormat::Hexadecimal),
        ],
    );
}

fn analyze(bytes: &[u8], password: Option<&str>) -> Result<StatementReport, AnalysisError> {
    analyze_pdf(bytes, password, &PipelineConfig::default())
}

fn direction_of(report: &StatementReport, description: &str) -> Direction {
    report
        .transactions
        .iter()
        .find(|t| t.description == description)
        .unwrap_or_else(|| panic!("no transaction for {description}"))
        .direction
}

#[test]
fn test_cell_per_block_page_is_read_as_table() {
    let bytes = to_bytes(document(vec![table_stream(STATEMENT)]));
    let report = analyze(&bytes, None).unwrap();

    let page = report.diagnostics.page(1).unwrap();
    assert_eq!(page.strategy, Strategy::Table);
    assert_eq!(page.tables_found, 1);
    assert_eq!(report.transactions.len(), 3);
    assert_eq!(direction_of(&report, "SWIGGY ORDER"), Direction::Debit);
    assert_eq!(direction_of(&report, "Ravi Kumar"), Direction::Credit);
    assert_eq!(direction_of(&report, "Uber trip"), Direction::Debit);
    assert_eq!(report.analysis.total_income, Decimal::new(50000, 2));
    assert_eq!(report.analysis.total_spent, Decimal::new(52550, 2));
}

#[test]
fn test_text_only_page_uses_fallback() {
    let bytes = to_bytes(document(vec![text_stream(&[
        "Transaction Statement",
        "01-06-2024 Paid to Electricity Board Rs.1200",
        "Thank you for using GPay",
    ])]));
    let report = analyze(&bytes, None).unwrap();

    let page = report.diagnostics.page(1).unwrap();
    assert_eq!(page.tables_found, 0);
    assert_eq!(page.strategy, Strategy::TextFallback);
    assert_eq!(report.transactions.len(), 1);
    let bill = &report.transactions[0];
    assert_eq!(bill.amount, Decimal::new(1200, 0));
    assert_eq!(bill.direction, Direction::Debit);
    assert_eq!(bill.category, Some(Category::BillsUtilities));
}

#[test]
fn test_undecodable_page_is_recorded_and_skipped() {
    let bytes = to_bytes(document(vec![
        table_stream(STATEMENT),
        undecodable_stream(),
    ]));
    let report = analyze(&bytes, None).unwrap();

    assert_eq!(report.status, RunStatus::Ok);
    assert_eq!(report.transactions.len(), 3);
    assert_eq!(report.diagnostics.error_count(), 1);
    let broken = report.diagnostics.page(2).unwrap();
    assert_eq!(broken.strategy, Strategy::None);
    assert!(broken.errors[0].starts_with("page 2: extraction failed"));
    assert!(report.diagnostics.page(1).unwrap().errors.is_empty());
}

#[test]
fn test_encrypted_statement_opens_with_password() {
    let mut doc = document(vec![table_stream(STATEMENT)]);
    encrypt(&mut doc, b"secret");
    let bytes = to_bytes(doc);

    let report = analyze(&bytes, Some("secret")).unwrap();
    assert_eq!(report.diagnostics.page(1).unwrap().strategy, Strategy::Table);
    assert_eq!(direction_of(&report, "Ravi Kumar"), Direction::Credit);
}

#[test]
fn test_encrypted_statement_without_password_is_unreadable() {
    let mut doc = document(vec![table_stream(STATEMENT)]);
    encrypt(&mut doc, b"secret");
    let bytes = to_bytes(doc);

    let missing = analyze(&bytes, None).unwrap_err();
    assert!(matches!(missing, AnalysisError::DocumentUnreadable { .. }));
    let wrong = analyze(&bytes, Some("guess")).unwrap_err();
    assert!(matches!(wrong, AnalysisError::DocumentUnreadable { .. }));
}

#[test]
fn test_empty_user_password_opens_without_prompt() {
    let mut doc = document(vec![table_stream(STATEMENT)]);
    encrypt(&mut doc, b"");
    let bytes = to_bytes(doc);

    let report = analyze(&bytes, None).unwrap();
    assert_eq!(report.transactions.len(), 3);
}
