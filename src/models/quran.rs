use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Revelation {
    Mekah,
    Madinah,
}

impl Revelation {
    /// Display name; the wire value is the lowercase variant name.
    pub fn label(self) -> &'static str {
        match self {
            Revelation::Mekah => "Makkiyah",
            Revelation::Madinah => "Madaniyah",
        }
    }
}

/// Chapter metadata as served by the Quran API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuranSurah {
    pub nomor: u32,
    pub nama: String,
    pub nama_latin: String,
    pub jumlah_ayat: u32,
    pub tempat_turun: Revelation,
    pub arti: String,
    pub deskripsi: String,
    pub audio: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuranDetail {
    #[serde(flatten)]
    pub surah: QuranSurah,
    pub ayat: Vec<QuranAyat>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuranAyat {
    pub id: u32,
    pub ar: String,
    pub tr: String,
    pub idn: String,
    pub audio: String,
}
