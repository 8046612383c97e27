//! Synthetic module images for unit tests.
//!
//! [`ImageBuilder`] writes a minimal PE32 or PE32+ image with a single `.text` section holding
//! the CLI header and the metadata. [`TestTables`] holds the heaps and table rows that go into
//! the metadata; [`TestTables::sample`] is a small module with one type of every kind the
//! navigation tests need:
//!
//! | TypeDef | Name       | Fields           | Methods       |
//! |---------|------------|------------------|---------------|
//! | 1       | `<Module>` |                  |               |
//! | 2       | `Program`  | `counter`, `label` | `Main`, `.ctor` |
//! | 3       | `Inner`    |                  |               |
//! | 4       | `Helper`   | `value`          | `Run`         |
//!
//! `Inner` is nested in `Program`. `Program` owns the event `Changed` and the property `Label`,
//! and carries two custom attributes; the assembly carries one.

use std::collections::HashMap;

use strum::{EnumCount, IntoEnumIterator};

use crate::metadata::tables::{
    key_column, CodedIndexType, TableId, TableInfo, TableLayout, HEAP_LARGE_BLOB,
    HEAP_LARGE_GUID, HEAP_LARGE_STRINGS,
};

/// Heaps and rows of a synthetic module.
#[derive(Clone, Debug)]
pub struct TestTables {
    strings: Vec<u8>,
    interned: HashMap<String, u32>,
    blob: Vec<u8>,
    guid: Vec<u8>,
    user_strings: Vec<u8>,
    rows: Vec<Vec<Vec<u32>>>,
    unsorted: u64,
    uncompressed: bool,
}

impl Default for TestTables {
    fn default() -> Self {
        Self::new()
    }
}

impl TestTables {
    /// Empty heaps and no rows.
    pub fn new() -> Self {
        TestTables {
            strings: vec![0],
            interned: HashMap::new(),
            blob: vec![0],
            guid: Vec::new(),
            user_strings: vec![0],
            rows: vec![Vec::new(); TableId::COUNT],
            unsorted: 0,
            uncompressed: false,
        }
    }

    /// Intern `value` in `#Strings`.
    pub fn string(&mut self, value: &str) -> u32 {
        if value.is_empty() {
            return 0;
        }
        if let Some(&index) = self.interned.get(value) {
            return index;
        }

        let index = self.strings.len() as u32;
        self.strings.extend_from_slice(value.as_bytes());
        self.strings.push(0);
        self.interned.insert(value.to_string(), index);
        index
    }

    /// Append `value` to `#Blob`.
    pub fn blob(&mut self, value: &[u8]) -> u32 {
        if value.is_empty() {
            return 0;
        }

        let index = self.blob.len() as u32;
        compress(&mut self.blob, value.len() as u32);
        self.blob.extend_from_slice(value);
        index
    }

    /// Append `value` to `#GUID`, returning its 1-based index.
    pub fn guid(&mut self, value: [u8; 16]) -> u32 {
        self.guid.extend_from_slice(&value);
        (self.guid.len() / 16) as u32
    }

    /// Append `value` to `#US`.
    pub fn user_string(&mut self, value: &str) -> u32 {
        let index = self.user_strings.len() as u32;
        let units: Vec<u16> = value.encode_utf16().collect();
        compress(&mut self.user_strings, units.len() as u32 * 2 + 1);
        for unit in units {
            self.user_strings.extend_from_slice(&unit.to_le_bytes());
        }
        self.user_strings.push(0);
        index
    }

    /// Append a row of raw column values to `table`.
    pub fn row(&mut self, table: TableId, values: &[u32]) -> &mut Self {
        self.rows[table as usize].push(values.to_vec());
        self
    }

    /// Clear the sorted bit of `table`.
    pub fn unsorted(mut self, table: TableId) -> Self {
        self.unsorted |= 1 << table as u64;
        self
    }

    /// Emit the tables as an uncompressed `#-` stream.
    pub fn uncompressed(mut self) -> Self {
        self.uncompressed = true;
        self
    }

    /// Route the field lists through a `FieldPtr` table.
    pub fn with_field_ptr(mut self, physical: &[u32]) -> Self {
        for &row in physical {
            self.row(TableId::FieldPtr, &[row]);
        }
        self
    }

    /// The module described in the module docs.
    pub fn sample() -> Self {
        let mut t = TestTables::new();

        let mvid = t.guid(*b"ironscope-sample");
        let module_name = t.string("Sample.dll");
        t.row(TableId::Module, &[0, module_name, mvid, 0, 0]);

        let runtime = coded(CodedIndexType::ResolutionScope, TableId::AssemblyRef, 1);
        for name in ["Object", "ObsoleteAttribute", "EventHandler"] {
            let (name, namespace) = (t.string(name), t.string("System"));
            t.row(TableId::TypeRef, &[runtime, name, namespace]);
        }

        let object = coded(CodedIndexType::TypeDefOrRef, TableId::TypeRef, 1);
        let types = [
            (0x0000_0000, "<Module>", "", 0, 1, 1),
            (0x0010_0001, "Program", "Sample", object, 1, 1),
            (0x0010_0002, "Inner", "", object, 3, 3),
            (0x0010_0000, "Helper", "Sample", object, 3, 3),
        ];
        for (flags, name, namespace, extends, fields, methods) in types {
            let (name, namespace) = (t.string(name), t.string(namespace));
            t.row(
                TableId::TypeDef,
                &[flags, name, namespace, extends, fields, methods],
            );
        }

        for (name, signature) in [("counter", 0x08), ("label", 0x0E), ("value", 0x08)] {
            let (name, signature) = (t.string(name), t.blob(&[0x06, signature]));
            t.row(TableId::Field, &[0x0011, name, signature]);
        }

        let methods: [(u32, u32, &str, &[u8], u32); 3] = [
            (0x2050, 0x0096, "Main", &[0x00, 0x01, 0x01, 0x1D, 0x0E], 1),
            (0x2060, 0x1886, ".ctor", &[0x20, 0x00, 0x01], 2),
            (0x0000, 0x0086, "Run", &[0x00, 0x00, 0x01], 2),
        ];
        for (rva, flags, name, signature, params) in methods {
            let (name, signature) = (t.string(name), t.blob(signature));
            t.row(TableId::MethodDef, &[rva, 0, flags, name, signature, params]);
        }

        let args = t.string("args");
        t.row(TableId::Param, &[0, 1, args]);

        let (ctor, ctor_sig) = (t.string(".ctor"), t.blob(&[0x20, 0x00, 0x01]));
        let obsolete = coded(CodedIndexType::MemberRefParent, TableId::TypeRef, 2);
        t.row(TableId::MemberRef, &[obsolete, ctor, ctor_sig]);

        let value = t.blob(&42_i32.to_le_bytes());
        let counter = coded(CodedIndexType::HasConstant, TableId::Field, 1);
        t.row(TableId::Constant, &[0x08, 0, counter, value]);

        let attribute = coded(CodedIndexType::CustomAttributeType, TableId::MemberRef, 1);
        let arguments = t.blob(&[0x01, 0x00, 0x00, 0x00]);
        for (table, row) in [
            (TableId::TypeDef, 2),
            (TableId::Assembly, 1),
            (TableId::TypeDef, 2),
        ] {
            let parent = coded(CodedIndexType::HasCustomAttribute, table, row);
            t.row(TableId::CustomAttribute, &[parent, attribute, arguments]);
        }

        t.row(TableId::EventMap, &[2, 1]);
        let changed = t.string("Changed");
        let handler = coded(CodedIndexType::TypeDefOrRef, TableId::TypeRef, 3);
        t.row(TableId::Event, &[0, changed, handler]);

        t.row(TableId::PropertyMap, &[2, 1]);
        let (label, label_sig) = (t.string("Label"), t.blob(&[0x28, 0x00, 0x0E]));
        t.row(TableId::Property, &[0, label, label_sig]);

        let property = coded(CodedIndexType::HasSemantics, TableId::Property, 1);
        t.row(TableId::MethodSemantics, &[0x0002, 2, property]);

        t.row(TableId::NestedClass, &[3, 2]);

        let sample = t.string("Sample");
        t.row(TableId::Assembly, &[0x8004, 1, 2, 3, 4, 0, 0, sample, 0]);

        let (runtime_name, token) = (
            t.string("System.Runtime"),
            t.blob(&[0xB0, 0x3F, 0x5F, 0x7F, 0x11, 0xD5, 0x0A, 0x3A]),
        );
        t.row(
            TableId::AssemblyRef,
            &[8, 0, 0, 0, 0, token, runtime_name, 0, 0],
        );

        t.user_string("Hello");
        t
    }

    fn heap_sizes(&self) -> u8 {
        let mut flags = 0;
        if self.strings.len() > 0xFFFF {
            flags |= HEAP_LARGE_STRINGS;
        }
        if self.guid.len() / 16 > 0xFFFF {
            flags |= HEAP_LARGE_GUID;
        }
        if self.blob.len() > 0xFFFF {
            flags |= HEAP_LARGE_BLOB;
        }
        flags
    }

    /// Encode the table stream. Tables with a key column are sorted by it.
    pub fn table_stream(&self) -> Vec<u8> {
        let mut counts = [0_u32; TableId::COUNT];
        let mut valid = 0_u64;
        let mut sorted = 0_u64;
        for id in TableId::iter() {
            counts[id as usize] = self.rows[id as usize].len() as u32;
            if counts[id as usize] > 0 {
                valid |= 1 << id as u64;
            }
            if id.requires_sorting() {
                sorted |= 1 << id as u64;
            }
        }
        sorted &= !self.unsorted;

        let heap_sizes = self.heap_sizes();
        let info = TableInfo::new(counts, heap_sizes);

        let mut out = Vec::new();
        out.extend_from_slice(&0_u32.to_le_bytes());
        out.extend_from_slice(&[2, 0, heap_sizes, 1]);
        out.extend_from_slice(&valid.to_le_bytes());
        out.extend_from_slice(&sorted.to_le_bytes());
        for id in TableId::iter().filter(|&id| counts[id as usize] > 0) {
            out.extend_from_slice(&counts[id as usize].to_le_bytes());
        }

        for id in TableId::iter() {
            let layout = TableLayout::new(id, &info);
            let mut rows = self.rows[id as usize].clone();
            if let Some(key) = key_column(id) {
                rows.sort_by_key(|row| row[key]);
            }

            for row in rows {
                assert_eq!(row.len(), layout.columns.len(), "{:?} row width", id);
                for (value, column) in row.iter().zip(&layout.columns) {
                    match column.width {
                        1 => out.push(*value as u8),
                        2 => out.extend_from_slice(&(*value as u16).to_le_bytes()),
                        _ => out.extend_from_slice(&value.to_le_bytes()),
                    }
                }
            }
        }

        pad(&mut out);
        out
    }
}

/// Encode a coded index, panicking on an invalid target.
pub fn coded(kind: CodedIndexType, table: TableId, row: u32) -> u32 {
    kind.encode(table, row).unwrap()
}

fn compress(out: &mut Vec<u8>, value: u32) {
    match value {
        0..=0x7F => out.push(value as u8),
        0x80..=0x3FFF => out.extend_from_slice(&(0x8000 | value as u16).to_be_bytes()),
        _ => out.extend_from_slice(&(0xC000_0000 | value).to_be_bytes()),
    }
}

fn pad(out: &mut Vec<u8>) {
    while out.len() % 4 != 0 {
        out.push(0);
    }
}

/// Writes a PE image around a [`TestTables`] module.
#[derive(Clone, Debug)]
pub struct ImageBuilder {
    pe32_plus: bool,
    tables: TestTables,
}

impl Default for ImageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBuilder {
    /// File offset of the `.text` section.
    pub const TEXT_RAW_OFFSET: u32 = 0x200;
    /// RVA of the `.text` section.
    pub const TEXT_RVA: u32 = 0x2000;
    /// `e_lfanew`
    pub const PE_OFFSET: usize = 0x80;

    /// A PE32 image of [`TestTables::sample`].
    pub fn new() -> Self {
        ImageBuilder {
            pe32_plus: false,
            tables: TestTables::sample(),
        }
    }

    /// Write a PE32+ image instead.
    pub fn pe32_plus(mut self) -> Self {
        self.pe32_plus = true;
        self
    }

    /// Replace the module contents.
    pub fn tables(mut self, tables: TestTables) -> Self {
        self.tables = tables;
        self
    }

    /// File offset of the metadata root.
    pub fn metadata_offset() -> usize {
        Self::TEXT_RAW_OFFSET as usize + 72
    }

    fn metadata(&self) -> Vec<u8> {
        let tables = &self.tables;
        let table_name = if tables.uncompressed { "#-" } else { "#~" };
        let mut streams = vec![
            (table_name, tables.table_stream()),
            ("#Strings", tables.strings.clone()),
            ("#US", tables.user_strings.clone()),
            ("#GUID", tables.guid.clone()),
            ("#Blob", tables.blob.clone()),
        ];
        for (_, data) in &mut streams {
            pad(data);
        }

        let version = b"v4.0.30319\0\0";
        let headers: usize = streams
            .iter()
            .map(|(name, _)| 8 + (name.len() + 4) / 4 * 4)
            .sum();

        let mut out = Vec::new();
        out.extend_from_slice(&0x424A_5342_u32.to_le_bytes());
        out.extend_from_slice(&1_u16.to_le_bytes());
        out.extend_from_slice(&1_u16.to_le_bytes());
        out.extend_from_slice(&0_u32.to_le_bytes());
        out.extend_from_slice(&(version.len() as u32).to_le_bytes());
        out.extend_from_slice(version);
        out.extend_from_slice(&0_u16.to_le_bytes());
        out.extend_from_slice(&(streams.len() as u16).to_le_bytes());

        let mut offset = out.len() + headers;
        for (name, data) in &streams {
            out.extend_from_slice(&(offset as u32).to_le_bytes());
            out.extend_from_slice(&(data.len() as u32).to_le_bytes());
            out.extend_from_slice(name.as_bytes());
            out.push(0);
            pad(&mut out);
            offset += data.len();
        }

        for (_, data) in &streams {
            out.extend_from_slice(data);
        }
        out
    }

    /// Write the image.
    pub fn build(&self) -> Vec<u8> {
        let metadata = self.metadata();

        let mut text = Vec::new();
        text.extend_from_slice(&72_u32.to_le_bytes());
        text.extend_from_slice(&2_u16.to_le_bytes());
        text.extend_from_slice(&5_u16.to_le_bytes());
        text.extend_from_slice(&(Self::TEXT_RVA + 72).to_le_bytes());
        text.extend_from_slice(&(metadata.len() as u32).to_le_bytes());
        text.extend_from_slice(&1_u32.to_le_bytes());
        text.extend_from_slice(&0x0600_0001_u32.to_le_bytes());
        text.resize(72, 0);
        text.extend_from_slice(&metadata);
        let text_size = (text.len() as u32 + 0x1FF) & !0x1FF;
        text.resize(text_size as usize, 0);

        let (optional_size, fixed) = if self.pe32_plus { (240, 112) } else { (224, 96) };

        let mut image = vec![0_u8; Self::TEXT_RAW_OFFSET as usize];
        image[0..2].copy_from_slice(b"MZ");
        image[0x3C..0x40].copy_from_slice(&(Self::PE_OFFSET as u32).to_le_bytes());

        let mut at = Self::PE_OFFSET;
        let put = |image: &mut Vec<u8>, at: &mut usize, bytes: &[u8]| {
            image[*at..*at + bytes.len()].copy_from_slice(bytes);
            *at += bytes.len();
        };

        put(&mut image, &mut at, b"PE\0\0");
        let machine: u16 = if self.pe32_plus { 0x8664 } else { 0x014C };
        put(&mut image, &mut at, &machine.to_le_bytes());
        put(&mut image, &mut at, &1_u16.to_le_bytes());
        put(&mut image, &mut at, &[0; 12]);
        put(&mut image, &mut at, &(optional_size as u16).to_le_bytes());
        put(&mut image, &mut at, &0x2102_u16.to_le_bytes());

        let optional = at;
        let magic: u16 = if self.pe32_plus { 0x20B } else { 0x10B };
        put(&mut image, &mut at, &magic.to_le_bytes());
        if self.pe32_plus {
            image[optional + 24..optional + 32]
                .copy_from_slice(&0x0000_0001_8000_0000_u64.to_le_bytes());
        } else {
            image[optional + 28..optional + 32].copy_from_slice(&0x0040_0000_u32.to_le_bytes());
        }
        image[optional + 32..optional + 36].copy_from_slice(&0x2000_u32.to_le_bytes());
        image[optional + 36..optional + 40].copy_from_slice(&0x200_u32.to_le_bytes());
        image[optional + 56..optional + 60]
            .copy_from_slice(&(Self::TEXT_RVA + text_size).to_le_bytes());
        image[optional + 60..optional + 64].copy_from_slice(&Self::TEXT_RAW_OFFSET.to_le_bytes());
        image[optional + fixed - 4..optional + fixed].copy_from_slice(&16_u32.to_le_bytes());

        let clr = optional + fixed + 14 * 8;
        image[clr..clr + 4].copy_from_slice(&Self::TEXT_RVA.to_le_bytes());
        image[clr + 4..clr + 8].copy_from_slice(&72_u32.to_le_bytes());

        let mut at = optional + optional_size;
        put(&mut image, &mut at, b".text\0\0\0");
        put(&mut image, &mut at, &text_size.to_le_bytes());
        put(&mut image, &mut at, &Self::TEXT_RVA.to_le_bytes());
        put(&mut image, &mut at, &text_size.to_le_bytes());
        put(&mut image, &mut at, &Self::TEXT_RAW_OFFSET.to_le_bytes());
        put(&mut image, &mut at, &[0; 12]);
        put(&mut image, &mut at, &0x6000_0020_u32.to_le_bytes());

        image.extend_from_slice(&text);
        image
    }
}
