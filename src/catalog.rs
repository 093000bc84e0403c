//! Built-in catalog of reference paintings
//!
//! The paintings an embedding UI offers as generation sources. A catalog
//! entry's filename is resolved against the configured asset base URL at
//! submission time; the crate ships the metadata so galleries can be rendered
//! without a network round trip.

/// One painting available as a generation source
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Painting {
    /// Stable identifier usable as a request source reference
    pub id: &'static str,
    /// Display title
    pub title: &'static str,
    /// Artist name
    pub artist: &'static str,
    /// Image filename under the asset base URL
    pub filename: &'static str,
    /// Short description for gallery display
    pub description: &'static str,
    /// Art-historical period
    pub period: &'static str,
}

/// The built-in reference paintings, in gallery display order
pub const PAINTINGS: &[Painting] = &[
    Painting {
        id: "mona-lisa",
        title: "Mona Lisa",
        artist: "Leonardo da Vinci",
        filename: "mona_lisa_leonardo_da_vinci_high_quality_painting.jpg",
        description: "The world's most famous portrait, known for its enigmatic smile",
        period: "Renaissance",
    },
    Painting {
        id: "starry-night",
        title: "The Starry Night",
        artist: "Vincent van Gogh",
        filename: "vincent_van_gogh_starry_night_painting_high_resolution.jpg",
        description: "An expressionist masterpiece of Van Gogh's swirling brushwork",
        period: "Post-Impressionism",
    },
    Painting {
        id: "girl-pearl-earring",
        title: "Girl with a Pearl Earring",
        artist: "Johannes Vermeer",
        filename: "girl_with_pearl_earring_johannes_vermeer_painting_high_quality.jpg",
        description: "The pearl of the Dutch Golden Age, celebrated for its pure light",
        period: "Baroque",
    },
    Painting {
        id: "great-wave",
        title: "The Great Wave off Kanagawa",
        artist: "Katsushika Hokusai",
        filename: "the_great_wave_off_kanagawa_hokusai_japanese_art.jpg",
        description: "The classic of Japanese ukiyo-e, capturing nature's sublime power",
        period: "Edo period",
    },
    Painting {
        id: "american-gothic",
        title: "American Gothic",
        artist: "Grant Wood",
        filename: "american_gothic_grant_wood_painting.jpg",
        description: "An icon of American Regionalism depicting Midwestern resolve",
        period: "Modernism",
    },
    Painting {
        id: "the-scream",
        title: "The Scream",
        artist: "Edvard Munch",
        filename: "the_scream_edvard_munch_painting_high_quality.jpg",
        description: "An expressionist cry of modern anxiety and despair",
        period: "Expressionism",
    },
    Painting {
        id: "las-meninas",
        title: "Las Meninas",
        artist: "Diego Velazquez",
        filename: "las_meninas_diego_velazquez_painting_high_quality.jpg",
        description: "A Spanish Golden Age masterwork of intricate composition and perspective",
        period: "Baroque",
    },
    Painting {
        id: "birth-of-venus",
        title: "The Birth of Venus",
        artist: "Sandro Botticelli",
        filename: "The_Birth_of_Venus_Sandro_Botticelli_Painting.jpg",
        description: "A mythological Renaissance vision of classical ideal beauty",
        period: "Renaissance",
    },
    Painting {
        id: "persistence-memory",
        title: "The Persistence of Memory",
        artist: "Salvador Dali",
        filename: "the_persistence_of_memory_salvador_dali_painting.jpeg",
        description: "The surrealist classic probing time through melting clocks",
        period: "Surrealism",
    },
    Painting {
        id: "guernica",
        title: "Guernica",
        artist: "Pablo Picasso",
        filename: "Guernica_Pablo_Picasso_painting_high_resolution_monochrome.jpg",
        description: "A monumental cubist condemnation of the atrocities of war",
        period: "Cubism",
    },
];

/// Look up a catalog painting by its id
pub fn find(id: &str) -> Option<&'static Painting> {
    PAINTINGS.iter().find(|p| p.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_returns_known_paintings() {
        let painting = find("starry-night").unwrap();
        assert_eq!(painting.artist, "Vincent van Gogh");
    }

    #[test]
    fn find_returns_none_for_unknown_id() {
        assert!(find("water-lilies").is_none());
    }

    #[test]
    fn catalog_ids_are_unique() {
        for (i, a) in PAINTINGS.iter().enumerate() {
            for b in &PAINTINGS[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
    }
}
