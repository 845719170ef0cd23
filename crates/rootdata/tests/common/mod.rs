//! Byte-level writer for small ROOT files used by the integration tests.
//!
//! Most files carry no `StreamerInfo` record, so the reader decodes them
//! with its built-in class layouts. [`Layout::Extended`] payloads add
//! members the built-in layouts lack and must be paired with the record
//! written by [`FileBuilder::streamer_info`].

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Write;

const K_BYTE_COUNT_MASK: u32 = 0x4000_0000;
pub const BEGIN: u64 = 100;
/// `TBasket` header bytes counted in the key length.
const BASKET_HEADER_LEN: usize = 19;

/// Payload encoding of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    Raw,
    Zlib,
    Lz4,
}

/// Class layouts the streamed objects follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// The reader's built-in layouts.
    Builtin,
    /// Built-in layouts plus extra string and counted-array members, as
    /// described by [`extended_streamer_list`].
    Extended,
}

/// Builder for a complete ROOT file.
pub struct FileBuilder {
    buf: Vec<u8>,
    large: bool,
}

impl FileBuilder {
    pub fn new(large: bool) -> Self {
        let mut buf = vec![0u8; BEGIN as usize];
        buf[..4].copy_from_slice(b"root");
        let version: u32 = if large { 1_062_206 } else { 62_206 };
        buf[4..8].copy_from_slice(&version.to_be_bytes());
        Self { buf, large }
    }

    /// Offset the next key will be written at.
    pub fn pos(&self) -> u64 {
        self.buf.len() as u64
    }

    fn key_version(&self) -> u16 {
        if self.large { 1004 } else { 4 }
    }

    /// Key header length for a key with these strings.
    pub fn key_len(&self, class: &str, name: &str, title: &str) -> usize {
        let seeks = if self.large { 16 } else { 8 };
        18 + seeks + 3 + class.len() + name.len() + title.len()
    }

    /// Append a key record; returns its offset.
    #[allow(clippy::too_many_arguments)]
    pub fn key(
        &mut self,
        class: &str,
        name: &str,
        title: &str,
        cycle: u16,
        pdir: u64,
        payload: &[u8],
        codec: Codec,
        extra_header: &[u8],
    ) -> u64 {
        let pos = self.pos();
        let key_len = self.key_len(class, name, title) + extra_header.len();
        let data = encode(payload, codec);
        let n_bytes = (key_len + data.len()) as i32;

        self.buf.extend_from_slice(&n_bytes.to_be_bytes());
        self.buf.extend_from_slice(&self.key_version().to_be_bytes());
        self.buf.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        self.buf.extend_from_slice(&0x6b4c_2a10u32.to_be_bytes()); // datime
        self.buf.extend_from_slice(&(key_len as u16).to_be_bytes());
        self.buf.extend_from_slice(&cycle.to_be_bytes());
        if self.large {
            self.buf.extend_from_slice(&pos.to_be_bytes());
            self.buf.extend_from_slice(&pdir.to_be_bytes());
        } else {
            self.buf.extend_from_slice(&(pos as u32).to_be_bytes());
            self.buf.extend_from_slice(&(pdir as u32).to_be_bytes());
        }
        for s in [class, name, title] {
            self.buf.push(s.len() as u8);
            self.buf.extend_from_slice(s.as_bytes());
        }
        self.buf.extend_from_slice(extra_header);
        self.buf.extend_from_slice(&data);
        pos
    }

    /// Top-level object key with cycle 1.
    pub fn object(&mut self, class: &str, name: &str, payload: &[u8], codec: Codec) -> u64 {
        self.key(class, name, "", 1, BEGIN, payload, codec, &[])
    }

    /// Sub-directory key inside the folder at `pdir`; returns its offset.
    pub fn directory(&mut self, name: &str, pdir: u64) -> u64 {
        self.key("TDirectoryFile", name, "", 1, pdir, &[0x11; 42], Codec::Raw, &[])
    }

    /// `TBasket` key holding raw rows of `branch`; returns its offset.
    pub fn basket(&mut self, branch: &str, tree: &str, rows: &[u8], codec: Codec) -> u64 {
        self.key("TBasket", branch, tree, 1, BEGIN, rows, codec, &[0x22; BASKET_HEADER_LEN])
    }

    /// `StreamerInfo` record describing the [`Layout::Extended`] classes.
    pub fn streamer_info(&mut self, codec: Codec) -> u64 {
        let title = "Doubly linked list";
        let payload = extended_streamer_list(self.key_len("TList", "StreamerInfo", title));
        self.key("TList", "StreamerInfo", title, 1, BEGIN, &payload, codec, &[])
    }

    /// Append a free segment of `len` bytes.
    pub fn free_segment(&mut self, len: usize) {
        self.buf.extend_from_slice(&(-(len as i32)).to_be_bytes());
        self.buf.resize(self.buf.len() + len - 4, 0xee);
    }

    /// Append arbitrary bytes.
    pub fn raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Finish the header (`fEND` = current length) and return the file.
    pub fn finish(self) -> Vec<u8> {
        let end = self.buf.len() as u64;
        self.finish_with_end(end)
    }

    /// Finish the header with an explicit `fEND`.
    pub fn finish_with_end(mut self, end: u64) -> Vec<u8> {
        let mut h = Vec::new();
        h.extend_from_slice(&(BEGIN as u32).to_be_bytes());
        if self.large {
            h.extend_from_slice(&end.to_be_bytes());
            h.extend_from_slice(&0u64.to_be_bytes()); // fSeekFree
        } else {
            h.extend_from_slice(&(end as u32).to_be_bytes());
            h.extend_from_slice(&0u32.to_be_bytes());
        }
        h.extend_from_slice(&0u32.to_be_bytes()); // fNbytesFree
        h.extend_from_slice(&0u32.to_be_bytes()); // nfree
        h.extend_from_slice(&60u32.to_be_bytes()); // fNbytesName
        h.push(if self.large { 8 } else { 4 });
        h.extend_from_slice(&101i32.to_be_bytes());
        if self.large {
            h.extend_from_slice(&0u64.to_be_bytes());
        } else {
            h.extend_from_slice(&0u32.to_be_bytes());
        }
        h.extend_from_slice(&0u32.to_be_bytes()); // fNbytesInfo
        self.buf[8..8 + h.len()].copy_from_slice(&h);
        self.buf
    }
}

/// RZip-encode `payload`.
pub fn encode(payload: &[u8], codec: Codec) -> Vec<u8> {
    let (tag, method, body): (&[u8; 2], u8, Vec<u8>) = match codec {
        Codec::Raw => return payload.to_vec(),
        Codec::Zlib => {
            let mut e = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::best());
            e.write_all(payload).unwrap();
            (b"ZL", 8, e.finish().unwrap())
        }
        Codec::Lz4 => {
            let compressed = lz4_flex::compress(payload);
            let mut body = xxhash_rust::xxh64::xxh64(&compressed, 0).to_be_bytes().to_vec();
            body.extend_from_slice(&compressed);
            (b"L4", 1, body)
        }
    };
    let mut out = tag.to_vec();
    out.push(method);
    out.extend_from_slice(&(body.len() as u32).to_le_bytes()[..3]);
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes()[..3]);
    out.extend_from_slice(&body);
    out
}

/// Streamed-object writer with byte counts and class tags.
pub struct ObjWriter {
    pub buf: Vec<u8>,
    displacement: usize,
    classes: HashMap<String, u32>,
    layout: Layout,
}

impl ObjWriter {
    pub fn new(displacement: usize) -> Self {
        Self::with_layout(displacement, Layout::Builtin)
    }

    pub fn with_layout(displacement: usize, layout: Layout) -> Self {
        Self { buf: Vec::new(), displacement, classes: HashMap::new(), layout }
    }

    pub fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn i16(&mut self, v: i16) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn i64(&mut self, v: i64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn f32(&mut self, v: f32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn f64(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn string(&mut self, s: &str) {
        self.buf.push(s.len() as u8);
        self.buf.extend_from_slice(s.as_bytes());
    }

    pub fn tobject(&mut self) {
        self.u16(1);
        self.i32(0);
        self.i32(0x0300_0000);
    }

    /// Open a byte-counted object; returns the patch position.
    pub fn begin(&mut self, version: u16) -> usize {
        let at = self.buf.len();
        self.i32(0);
        self.u16(version);
        at
    }

    pub fn end(&mut self, at: usize) {
        let count = (self.buf.len() - at - 4) as u32 | K_BYTE_COUNT_MASK;
        self.buf[at..at + 4].copy_from_slice(&count.to_be_bytes());
    }

    pub fn tnamed(&mut self, name: &str, title: &str) {
        let at = self.begin(1);
        self.tobject();
        self.string(name);
        self.string(title);
        self.end(at);
    }

    /// Attribute base class with some opaque members.
    pub fn attributes(&mut self, bytes: usize) {
        let at = self.begin(2);
        self.buf.resize(self.buf.len() + bytes, 0x01);
        self.end(at);
    }

    /// Open a collection element with its class tag; close with `end`.
    pub fn begin_element(&mut self, class: &str) -> usize {
        let at = self.buf.len();
        self.i32(0);
        let tag_pos = self.buf.len();
        if let Some(&key) = self.classes.get(class) {
            self.buf.extend_from_slice(&(0x8000_0000 | key).to_be_bytes());
        } else {
            self.buf.extend_from_slice(&0xFFFF_FFFFu32.to_be_bytes());
            self.buf.extend_from_slice(class.as_bytes());
            self.buf.push(0);
            self.classes.insert(class.to_string(), (self.displacement + tag_pos + 2) as u32);
        }
        at
    }

    /// Open a `TObjArray` member with `n` entries; close with `end`.
    pub fn begin_obj_array(&mut self, n: i32) -> usize {
        let at = self.begin(3);
        self.tobject();
        self.string("");
        self.i32(n);
        self.i32(0);
        at
    }

    pub fn empty_obj_array(&mut self) {
        let at = self.begin_obj_array(0);
        self.end(at);
    }

    fn axis(&mut self, nbins: i32, xmin: f64, xmax: f64, edges: Option<&[f64]>) {
        let at = self.begin(10);
        self.tnamed("xaxis", "");
        self.attributes(18); // TAttAxis
        self.i32(nbins);
        if self.layout == Layout::Extended {
            self.string("cm"); // fUnit
        }
        self.f64(xmin);
        self.f64(xmax);
        let edges = edges.unwrap_or(&[]);
        self.i32(edges.len() as i32);
        for &e in edges {
            self.f64(e);
        }
        self.i32(0); // fFirst
        self.i32(0); // fLast
        self.u16(0); // fBits2
        self.end(at);
    }
}

/// Histogram contents for [`th1_payload`].
pub struct Hist<'a> {
    pub class: &'a str,
    pub name: &'a str,
    pub nbins: i32,
    pub xmin: f64,
    pub xmax: f64,
    pub edges: Option<&'a [f64]>,
    pub sumw2: Option<&'a [f64]>,
    /// All bins, under- and overflow included.
    pub contents: &'a [f64],
}

/// Streamed `TH1D`/`TH1F` object.
pub fn th1_payload(h: &Hist) -> Vec<u8> {
    th1_payload_with(h, Layout::Builtin)
}

/// Streamed `TH1D`/`TH1F` object following `layout`.
pub fn th1_payload_with(h: &Hist, layout: Layout) -> Vec<u8> {
    let mut w = ObjWriter::with_layout(0, layout);
    let outer = w.begin(3);
    let th1 = w.begin(8);
    w.tnamed(h.name, "a test histogram");
    w.attributes(6); // TAttLine
    w.attributes(4); // TAttFill
    w.attributes(8); // TAttMarker
    w.i32(h.nbins + 2);
    w.axis(h.nbins, h.xmin, h.xmax, h.edges);
    w.axis(1, 0.0, 1.0, None);
    w.axis(1, 0.0, 1.0, None);
    w.i16(1000); // fBarOffset
    w.i16(1000); // fBarWidth
    for stat in [42.0, 41.0, 40.0, 1.5, 2.5, -1111.0, -1111.0, 0.0] {
        w.f64(stat);
    }
    if layout == Layout::Extended {
        w.string("two peaks"); // fLabel
        w.i32(2); // fNpeaks
        w.u8(1);
        w.f64(2.5); // fPeaks
        w.f64(7.5);
    }
    w.i32(0); // fContour
    let sumw2 = h.sumw2.unwrap_or(&[]);
    w.i32(sumw2.len() as i32);
    for &v in sumw2 {
        w.f64(v);
    }
    w.string(""); // fOption
    w.i32(0); // fFunctions
    w.end(th1);
    w.i32(h.contents.len() as i32);
    for &v in h.contents {
        if h.class == "TH1F" {
            w.f32(v as f32);
        } else {
            w.f64(v);
        }
    }
    w.end(outer);
    w.buf
}

/// One leaf of a branch.
pub struct Leaf<'a> {
    pub class: &'a str,
    pub name: &'a str,
    pub len: i32,
    pub size: i32,
    pub unsigned: bool,
}

/// One top-level branch.
pub struct Branch<'a> {
    pub class: &'a str,
    pub name: &'a str,
    pub leaves: Vec<Leaf<'a>>,
    /// First entry of each basket plus the total entry count.
    pub basket_entry: Vec<i64>,
    pub basket_seek: Vec<u64>,
    /// Split sub-branches stored in `fBranches`.
    pub sub_branches: Vec<Branch<'a>>,
}

const MAX_BASKETS: usize = 10;

/// Streamed `TTree` (or `TNtuple` when `ntuple`); `displacement` is the
/// key length of the key the payload is stored under.
pub fn tree_payload(
    displacement: usize,
    ntuple: bool,
    name: &str,
    entries: i64,
    branches: &[Branch],
) -> Vec<u8> {
    tree_payload_with(displacement, ntuple, name, entries, branches, Layout::Builtin)
}

/// [`tree_payload`] with branches following `layout`.
pub fn tree_payload_with(
    displacement: usize,
    ntuple: bool,
    name: &str,
    entries: i64,
    branches: &[Branch],
    layout: Layout,
) -> Vec<u8> {
    let mut w = ObjWriter::with_layout(displacement, layout);
    let wrapper = ntuple.then(|| w.begin(2));
    let tree = w.begin(20);
    w.tnamed(name, "a test tree");
    w.attributes(6);
    w.attributes(4);
    w.attributes(8);
    w.i64(entries);
    for _ in 0..5 {
        w.i64(7); // fTotBytes .. fWeight
    }
    for _ in 0..4 {
        w.i32(25); // fTimerInterval .. fDefaultEntryOffsetLen
    }
    w.i32(0); // fNClusterRange
    for _ in 0..6 {
        w.i64(1000); // fMaxEntries .. fEstimate
    }
    w.u8(0); // fClusterRangeEnd
    w.u8(0); // fClusterSize

    let array = w.begin_obj_array(branches.len() as i32);
    for branch in branches {
        write_branch(&mut w, branch);
    }
    w.end(array);
    w.empty_obj_array(); // fLeaves
    w.end(tree);
    if let Some(at) = wrapper {
        w.i32(1); // fNvar
        w.end(at);
    }
    w.buf
}

fn write_branch(w: &mut ObjWriter, b: &Branch) {
    let element = w.begin_element(b.class);
    let derived = (b.class == "TBranchElement").then(|| w.begin(10));
    let base = w.begin(13);
    w.tnamed(b.name, "");
    w.attributes(4); // TAttFill
    w.i32(1); // fCompress
    w.i32(32000); // fBasketSize
    w.i32(0); // fEntryOffsetLen
    w.i32(b.basket_seek.len() as i32); // fWriteBasket
    w.i64(*b.basket_entry.last().unwrap_or(&0)); // fEntryNumber
    if w.layout == Layout::Extended {
        w.string("alias"); // fAlias
    }
    w.i32(0); // fOffset
    w.i32(MAX_BASKETS as i32);
    w.i32(99); // fSplitLevel
    for _ in 0..4 {
        w.i64(3);
    }
    let subs = w.begin_obj_array(b.sub_branches.len() as i32);
    for sub in &b.sub_branches {
        write_branch(w, sub);
    }
    w.end(subs);

    let leaves = w.begin_obj_array(b.leaves.len() as i32);
    for leaf in &b.leaves {
        let at = w.begin_element(leaf.class);
        let derived = w.begin(1);
        let tleaf = w.begin(2);
        w.tnamed(leaf.name, "");
        w.i32(leaf.len);
        w.i32(leaf.size);
        w.i32(0); // fOffset
        w.u8(0); // fIsRange
        w.u8(leaf.unsigned as u8);
        w.i32(0); // fLeafCount
        w.end(tleaf);
        w.f64(0.0); // fMinimum
        w.f64(0.0); // fMaximum
        w.end(derived);
        w.end(at);
    }
    w.end(leaves);
    w.empty_obj_array(); // fBaskets

    w.u8(1);
    for i in 0..MAX_BASKETS {
        w.i32(if i < b.basket_seek.len() { 100 } else { 0 });
    }
    if w.layout == Layout::Extended {
        w.u8(1);
        for i in 0..MAX_BASKETS {
            w.i32(-(i as i32) - 1); // fBasketCluster
        }
    }
    w.u8(1);
    for i in 0..MAX_BASKETS {
        w.i64(b.basket_entry.get(i).copied().unwrap_or(0));
    }
    w.u8(1);
    for i in 0..MAX_BASKETS {
        w.i64(b.basket_seek.get(i).map_or(0, |&s| s as i64));
    }
    w.string(""); // fFileName
    w.end(base);
    if let Some(at) = derived {
        w.string("vector<float>"); // fClassName
        w.end(at);
    }
    w.end(element);
}

/// Big-endian bytes of a row made of `f64` values.
pub fn f64_rows(values: &[f64]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_be_bytes()).collect()
}

/// The standard test tree `events`:
/// - `x` (double): 0.5, 1.5, 2.5, 3.5, 4.5 in two baskets of 3 and 2 rows
/// - `n` (unsigned int): 1, 4_000_000_000, 7, 8, 9
/// - `arr` (float[3]): row i is `[i, 10 + i, 20 + i]`
/// - `pair` with leaves `a` (float) and `b` (int): `a = -i`, `b = 100 * i`
pub fn events_file(codec: Codec, large: bool) -> Vec<u8> {
    let mut f = FileBuilder::new(large);
    let split = |rows: Vec<u8>, stride: usize| {
        let (a, b) = rows.split_at(3 * stride);
        (a.to_vec(), b.to_vec())
    };

    let x = f64_rows(&[0.5, 1.5, 2.5, 3.5, 4.5]);
    let (x0, x1) = split(x, 8);
    let n: Vec<u8> = [1u32, 4_000_000_000, 7, 8, 9].iter().flat_map(|v| v.to_be_bytes()).collect();
    let (n0, n1) = split(n, 4);
    let arr: Vec<u8> = (0..5)
        .flat_map(|i| [i as f32, 10.0 + i as f32, 20.0 + i as f32])
        .flat_map(|v| v.to_be_bytes())
        .collect();
    let (arr0, arr1) = split(arr, 12);
    let pair: Vec<u8> = (0..5)
        .flat_map(|i| {
            let mut row = (-(i as f32)).to_be_bytes().to_vec();
            row.extend_from_slice(&(100 * i as i32).to_be_bytes());
            row
        })
        .collect();
    let (pair0, pair1) = split(pair, 8);

    let mut seeks = Vec::new();
    for (name, first, second) in
        [("x", x0, x1), ("n", n0, n1), ("arr", arr0, arr1), ("pair", pair0, pair1)]
    {
        seeks.push(vec![f.basket(name, "events", &first, codec), f.basket(name, "events", &second, codec)]);
    }

    let entries = vec![0, 3, 5];
    let branches = vec![
        Branch {
            class: "TBranch",
            name: "x",
            leaves: vec![Leaf { class: "TLeafD", name: "x", len: 1, size: 8, unsigned: false }],
            basket_entry: entries.clone(),
            basket_seek: seeks[0].clone(),
            sub_branches: Vec::new(),
        },
        Branch {
            class: "TBranch",
            name: "n",
            leaves: vec![Leaf { class: "TLeafI", name: "n", len: 1, size: 4, unsigned: true }],
            basket_entry: entries.clone(),
            basket_seek: seeks[1].clone(),
            sub_branches: Vec::new(),
        },
        Branch {
            class: "TBranchElement",
            name: "arr",
            leaves: vec![Leaf { class: "TLeafF", name: "arr", len: 3, size: 4, unsigned: false }],
            basket_entry: entries.clone(),
            basket_seek: seeks[2].clone(),
            sub_branches: Vec::new(),
        },
        Branch {
            class: "TBranch",
            name: "pair",
            leaves: vec![
                Leaf { class: "TLeafF", name: "a", len: 1, size: 4, unsigned: false },
                Leaf { class: "TLeafI", name: "b", len: 1, size: 4, unsigned: false },
            ],
            basket_entry: entries,
            basket_seek: seeks[3].clone(),
            sub_branches: Vec::new(),
        },
    ];
    let displacement = f.key_len("TTree", "events", "");
    let payload = tree_payload(displacement, false, "events", 5, &branches);
    f.object("TTree", "events", &payload, codec);
    f.finish()
}

/// Uniform 10-bin histogram on `[0, 10)` with content `i` in bin `i` and
/// `sumw2 = 4 * i`.
pub fn uniform_hist(class: &str, name: &str) -> Vec<u8> {
    let contents: Vec<f64> = (0..12).map(|i| i as f64).collect();
    let sumw2: Vec<f64> = (0..12).map(|i| 4.0 * i as f64).collect();
    th1_payload(&Hist {
        class,
        name,
        nbins: 10,
        xmin: 0.0,
        xmax: 10.0,
        edges: None,
        sumw2: Some(&sumw2),
        contents: &contents,
    })
}

/// Streamer element: (class, member name, title, type code, size).
type Element<'a> = (&'a str, &'a str, &'a str, i32, i32);

impl ObjWriter {
    fn streamer_element(&mut self, &(class, name, title, ty, size): &Element) {
        let at = self.begin_element(class);
        let derived = self.begin(2);
        let base = self.begin(4);
        self.tnamed(name, title);
        self.i32(ty);
        self.i32(size);
        self.i32(0); // fArrayLength
        self.i32(0); // fArrayDim
        self.end(base);
        self.end(derived);
        self.end(at);
    }

    fn streamer_info(&mut self, class: &str, version: i32, elements: &[Element]) {
        let at = self.begin_element("TStreamerInfo");
        let info = self.begin(9);
        self.tnamed(class, "");
        self.i32(0x0bad_cafe); // fCheckSum
        self.i32(version);
        let array = self.begin_element("TObjArray");
        let body = self.begin(3);
        self.tobject();
        self.string("");
        self.i32(elements.len() as i32);
        self.i32(0);
        for element in elements {
            self.streamer_element(element);
        }
        self.end(body);
        self.end(array);
        self.end(info);
        self.end(at);
        self.string(""); // option
    }
}

/// `StreamerInfo` list for the [`Layout::Extended`] `TH1`, `TAxis` and
/// `TBranch` classes.
pub fn extended_streamer_list(displacement: usize) -> Vec<u8> {
    const BASE: i32 = 0;
    const INT: i32 = 3;
    const SHORT: i32 = 2;
    const DOUBLE: i32 = 8;
    const LONG64: i32 = 16;
    const COUNTER: i32 = 6;
    const OBJECT: i32 = 61;
    const STRING: i32 = 65;
    const POINTER_INT: i32 = 43;
    const POINTER_DOUBLE: i32 = 48;
    const POINTER_LONG64: i32 = 56;

    let th1: Vec<Element> = [
        ("TStreamerBase", "TNamed", "", BASE, 0),
        ("TStreamerBase", "TAttLine", "", BASE, 0),
        ("TStreamerBase", "TAttFill", "", BASE, 0),
        ("TStreamerBase", "TAttMarker", "", BASE, 0),
        ("TStreamerBasicType", "fNcells", "", INT, 4),
        ("TStreamerObject", "fXaxis", "", OBJECT, 0),
        ("TStreamerObject", "fYaxis", "", OBJECT, 0),
        ("TStreamerObject", "fZaxis", "", OBJECT, 0),
        ("TStreamerBasicType", "fBarOffset", "", SHORT, 2),
        ("TStreamerBasicType", "fBarWidth", "", SHORT, 2),
    ]
    .into_iter()
    .chain(
        [
            "fEntries",
            "fTsumw",
            "fTsumw2",
            "fTsumwx",
            "fTsumwx2",
            "fMaximum",
            "fMinimum",
            "fNormFactor",
        ]
        .into_iter()
        .map(|name| ("TStreamerBasicType", name, "", DOUBLE, 8)),
    )
    .chain([
        ("TStreamerString", "fLabel", "", STRING, 24),
        ("TStreamerBasicType", "fNpeaks", "", COUNTER, 4),
        ("TStreamerBasicPointer", "fPeaks", "[fNpeaks] peak positions", POINTER_DOUBLE, 8),
        ("TStreamerObjectAny", "fContour", "", 62, 24),
        ("TStreamerObjectAny", "fSumw2", "", 62, 24),
        ("TStreamerString", "fOption", "", STRING, 24),
        ("TStreamerObjectPointer", "fFunctions", "", 63, 8),
    ])
    .collect();

    let taxis: Vec<Element> = vec![
        ("TStreamerBase", "TNamed", "", BASE, 0),
        ("TStreamerBase", "TAttAxis", "", BASE, 0),
        ("TStreamerBasicType", "fNbins", "", INT, 4),
        ("TStreamerString", "fUnit", "", STRING, 24),
        ("TStreamerBasicType", "fXmin", "", DOUBLE, 8),
        ("TStreamerBasicType", "fXmax", "", DOUBLE, 8),
        ("TStreamerObjectAny", "fXbins", "", 62, 24),
        ("TStreamerBasicType", "fFirst", "", INT, 4),
        ("TStreamerBasicType", "fLast", "", INT, 4),
        ("TStreamerBasicType", "fBits2", "", 12, 2),
    ];

    let tbranch: Vec<Element> = vec![
        ("TStreamerBase", "TNamed", "", BASE, 0),
        ("TStreamerBase", "TAttFill", "", BASE, 0),
        ("TStreamerBasicType", "fCompress", "", INT, 4),
        ("TStreamerBasicType", "fBasketSize", "", INT, 4),
        ("TStreamerBasicType", "fEntryOffsetLen", "", INT, 4),
        ("TStreamerBasicType", "fWriteBasket", "", INT, 4),
        ("TStreamerBasicType", "fEntryNumber", "", LONG64, 8),
        ("TStreamerString", "fAlias", "", STRING, 24),
        ("TStreamerBasicType", "fOffset", "", INT, 4),
        ("TStreamerBasicType", "fMaxBaskets", "", COUNTER, 4),
        ("TStreamerBasicType", "fSplitLevel", "", INT, 4),
        ("TStreamerBasicType", "fEntries", "", LONG64, 8),
        ("TStreamerBasicType", "fFirstEntry", "", LONG64, 8),
        ("TStreamerBasicType", "fTotBytes", "", LONG64, 8),
        ("TStreamerBasicType", "fZipBytes", "", LONG64, 8),
        ("TStreamerObject", "fBranches", "", OBJECT, 64),
        ("TStreamerObject", "fLeaves", "", OBJECT, 64),
        ("TStreamerObject", "fBaskets", "", OBJECT, 64),
        ("TStreamerBasicPointer", "fBasketBytes", "[fMaxBaskets]", POINTER_INT, 4),
        ("TStreamerBasicPointer", "fBasketCluster", "[fMaxBaskets]", POINTER_INT, 4),
        ("TStreamerBasicPointer", "fBasketEntry", "[fMaxBaskets]", POINTER_LONG64, 8),
        ("TStreamerBasicPointer", "fBasketSeek", "[fMaxBaskets]", POINTER_LONG64, 8),
        ("TStreamerString", "fFileName", "", STRING, 24),
    ];

    let mut w = ObjWriter::new(displacement);
    let list = w.begin(5);
    w.tobject();
    w.string("");
    w.i32(3);
    w.streamer_info("TH1", 8, &th1);
    w.streamer_info("TAxis", 10, &taxis);
    w.streamer_info("TBranch", 13, &tbranch);
    w.end(list);
    w.buf
}
