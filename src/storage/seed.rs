use color_eyre::Result;
use log::info;

use super::entities::{NewArticle, NewMotorcycle};
use super::Storage;

// One-time bootstrap of the initial catalog. Runs at
// process start only, never from a request path. The
// idempotence check is per table: a table with any rows
// at all is left alone.

pub fn run(storage: &dyn Storage) -> Result<()> {
  let has_motorcycles = !storage.motorcycles()?.is_empty();
  let has_articles = !storage.articles()?.is_empty();

  if has_motorcycles && has_articles {
    info!("Database already seeded, skipping");
    return Ok(());
  }

  if !has_motorcycles {
    let motorcycles = initial_motorcycles();
    let count = motorcycles.len();
    for motorcycle in motorcycles {
      storage.create_motorcycle(motorcycle)?;
    }
    info!("Seeded {} motorcycles", count);
  }

  if !has_articles {
    let articles = initial_articles();
    let count = articles.len();
    for article in articles {
      storage.create_article(article)?;
    }
    info!("Seeded {} articles", count);
  }

  Ok(())
}

fn moto(
  name: &str,
  brand: &str,
  model: &str,
  engine_size: &str,
  horsepower: &str,
  moto_type: &str,
  category: &str,
  description: &str,
  image_url: &str
) -> NewMotorcycle {
  NewMotorcycle {
    name: name.to_string(),
    brand: brand.to_string(),
    model: model.to_string(),
    year: 2024,
    engine_size: engine_size.to_string(),
    horsepower: horsepower.to_string(),
    moto_type: moto_type.to_string(),
    category: category.to_string(),
    description: description.to_string(),
    image_url: image_url.to_string(),
    available: Some(true),
  }
}

// Real motorcycles available on the Tunisian market.
fn initial_motorcycles() -> Vec<NewMotorcycle> {
  vec![
    moto(
      "Honda CB650R", "Honda", "CB650R", "649cc", "95 HP",
      "gasoline", "naked",
      "A neo-sports caf\u{e9} racer with a 649cc inline-four engine, \
      perfect for Tunisian roads with excellent build quality and \
      reliability.",
      "https://images.unsplash.com/photo-1544966503-7cc5ac882d5f?ixlib=rb-4.0.3&auto=format&fit=crop&w=600&h=400"
    ),
    moto(
      "Honda CBR600RR", "Honda", "CBR600RR", "599cc", "118 HP",
      "gasoline", "sport",
      "A high-performance supersport motorcycle with race-inspired \
      technology and aggressive aerodynamics.",
      "https://images.unsplash.com/photo-1599819177302-fb9cb297161b?ixlib=rb-4.0.3&auto=format&fit=crop&w=600&h=400"
    ),
    moto(
      "Honda CRF1100L Africa Twin", "Honda", "CRF1100L Africa Twin",
      "1084cc", "102 HP", "gasoline", "adventure",
      "The legendary adventure bike built for exploring Africa and \
      beyond, with advanced electronics and robust construction.",
      "https://images.unsplash.com/photo-1558618047-3c8c76ca7d13?ixlib=rb-4.0.3&auto=format&fit=crop&w=600&h=400"
    ),
    moto(
      "BMW R 1250 GS", "BMW", "R 1250 GS", "1254cc", "136 HP",
      "gasoline", "adventure",
      "The ultimate adventure touring motorcycle with boxer engine \
      technology, ideal for exploring Tunisia's diverse landscapes.",
      "https://images.unsplash.com/photo-1591154669695-5f2a8d20c089?ixlib=rb-4.0.3&auto=format&fit=crop&w=600&h=400"
    ),
    moto(
      "BMW S1000RR", "BMW", "S1000RR", "999cc", "210 HP",
      "gasoline", "sport",
      "A track-focused superbike with race-derived technology and \
      extreme performance capabilities.",
      "https://images.unsplash.com/photo-1568772585407-9361f9bf3a87?ixlib=rb-4.0.3&auto=format&fit=crop&w=600&h=400"
    ),
    moto(
      "BMW F850GS", "BMW", "F850GS", "853cc", "95 HP",
      "gasoline", "adventure",
      "A mid-weight adventure bike perfect for both on-road touring \
      and off-road exploration.",
      "https://images.unsplash.com/photo-1609771860227-f1cbc0c3b8c8?ixlib=rb-4.0.3&auto=format&fit=crop&w=600&h=400"
    ),
    moto(
      "KTM 390 Duke", "KTM", "390 Duke", "373cc", "44 HP",
      "gasoline", "naked",
      "A lightweight naked bike with aggressive styling and excellent \
      performance, perfect for city riding and weekend adventures.",
      "https://images.unsplash.com/photo-1600298881974-6be191ceeda1?ixlib=rb-4.0.3&auto=format&fit=crop&w=600&h=400"
    ),
    moto(
      "KTM 890 Duke R", "KTM", "890 Duke R", "889cc", "121 HP",
      "gasoline", "naked",
      "The sharp-edged track weapon with premium components and \
      track-focused setup for serious riders.",
      "https://images.unsplash.com/photo-1580310614729-c55b4d71b77d?ixlib=rb-4.0.3&auto=format&fit=crop&w=600&h=400"
    ),
    moto(
      "KTM 1290 Super Adventure S", "KTM", "1290 Super Adventure S",
      "1301cc", "160 HP", "gasoline", "adventure",
      "The most powerful adventure bike from KTM with advanced \
      electronics and extreme performance.",
      "https://images.unsplash.com/photo-1591154669695-5f2a8d20c089?ixlib=rb-4.0.3&auto=format&fit=crop&w=600&h=400"
    ),
    moto(
      "Yamaha MT-07", "Yamaha", "MT-07", "689cc", "74 HP",
      "gasoline", "naked",
      "A versatile naked bike with a crossplane twin engine, offering \
      excellent balance of performance and comfort for every rider.",
      "https://images.unsplash.com/photo-1609878656663-0b223bba4df7?ixlib=rb-4.0.3&auto=format&fit=crop&w=600&h=400"
    ),
    moto(
      "Yamaha MT-09", "Yamaha", "MT-09", "889cc", "119 HP",
      "gasoline", "naked",
      "The Dark Side of Japan with a triple-cylinder engine that \
      delivers thrilling performance and character.",
      "https://images.unsplash.com/photo-1571068316344-75bc76f77890?ixlib=rb-4.0.3&auto=format&fit=crop&w=600&h=400"
    ),
    moto(
      "Yamaha YZF-R6", "Yamaha", "YZF-R6", "599cc", "117 HP",
      "gasoline", "sport",
      "A pure supersport motorcycle with race-bred technology and \
      uncompromising performance.",
      "https://images.unsplash.com/photo-1568772585407-9361f9bf3a87?ixlib=rb-4.0.3&auto=format&fit=crop&w=600&h=400"
    ),
    moto(
      "Yamaha T\u{e9}n\u{e9}r\u{e9} 700", "Yamaha",
      "T\u{e9}n\u{e9}r\u{e9} 700", "689cc", "73 HP",
      "gasoline", "adventure",
      "A rally-inspired adventure bike designed for serious off-road \
      exploration with lightweight construction.",
      "https://images.unsplash.com/photo-1558618047-3c8c76ca7d13?ixlib=rb-4.0.3&auto=format&fit=crop&w=600&h=400"
    ),
    moto(
      "Mash Seventy Five", "Mash", "Seventy Five", "125cc", "11 HP",
      "gasoline", "classic",
      "A retro-styled motorcycle combining vintage aesthetics with \
      modern reliability, perfect for urban commuting.",
      "https://images.unsplash.com/photo-1590736969955-71cc94901144?ixlib=rb-4.0.3&auto=format&fit=crop&w=600&h=400"
    ),
    moto(
      "Mash Black Seven", "Mash", "Black Seven", "125cc", "11 HP",
      "gasoline", "classic",
      "A stylish retro motorcycle with modern features and reliable \
      performance for daily commuting.",
      "https://images.unsplash.com/photo-1600298881974-6be191ceeda1?ixlib=rb-4.0.3&auto=format&fit=crop&w=600&h=400"
    ),
    moto(
      "Orcal Astor", "Orcal", "Astor", "Electric", "15 kW",
      "electric", "electric",
      "An innovative electric motorcycle with cutting-edge technology \
      and zero emissions, representing the future of mobility.",
      "https://images.unsplash.com/photo-1580310614729-c55b4d71b77d?ixlib=rb-4.0.3&auto=format&fit=crop&w=600&h=400"
    ),
    moto(
      "Orcal eX100", "Orcal", "eX100", "Electric", "8 kW",
      "electric", "electric",
      "A compact electric motorcycle designed for urban mobility with \
      modern styling and efficient performance.",
      "https://images.unsplash.com/photo-1544966503-7cc5ac882d5f?ixlib=rb-4.0.3&auto=format&fit=crop&w=600&h=400"
    ),
    moto(
      "Rieju MRT 125", "Rieju", "MRT 125", "125cc", "15 HP",
      "gasoline", "naked",
      "A Spanish motorcycle offering excellent value with modern design \
      and reliable performance for beginners.",
      "https://images.unsplash.com/photo-1599819177302-fb9cb297161b?ixlib=rb-4.0.3&auto=format&fit=crop&w=600&h=400"
    ),
    moto(
      "Rieju Tango 250", "Rieju", "Tango 250", "250cc", "25 HP",
      "gasoline", "adventure",
      "A lightweight adventure bike perfect for exploring Tunisia's \
      varied terrain with excellent fuel economy.",
      "https://images.unsplash.com/photo-1609771860227-f1cbc0c3b8c8?ixlib=rb-4.0.3&auto=format&fit=crop&w=600&h=400"
    ),
  ]
}

fn initial_articles() -> Vec<NewArticle> {
  vec![
    NewArticle {
      title: "Essential Motorcycle Maintenance Tips for Tunisian Climate"
        .to_string(),
      content: "Living in Tunisia means dealing with diverse weather \
        conditions that can be challenging for motorcycle maintenance. \
        From the Mediterranean coastal humidity to the dry Saharan winds, \
        your motorcycle needs special care to perform optimally..."
        .to_string(),
      excerpt: "Learn how to keep your motorcycle in perfect condition \
        despite Tunisia's challenging weather conditions..."
        .to_string(),
      author: "Ahmed Ben Ali".to_string(),
      category: "maintenance".to_string(),
      image_url: "https://images.unsplash.com/photo-1609832002830-de9dab51ebaf?ixlib=rb-4.0.3&auto=format&fit=crop&w=600&h=300".to_string(),
      published: Some(true),
    },
    NewArticle {
      title: "Electric Motorcycles: The Future of Transportation in Tunisia"
        .to_string(),
      content: "As Tunisia moves towards sustainable transportation, \
        electric motorcycles are gaining popularity. This comprehensive \
        review explores the benefits, challenges, and market trends of \
        electric motorcycles in Tunisia..."
        .to_string(),
      excerpt: "A comprehensive review of electric motorcycles and their \
        growing presence in the Tunisian market..."
        .to_string(),
      author: "Salma Cherni".to_string(),
      category: "review".to_string(),
      image_url: "https://images.unsplash.com/photo-1571068316344-75bc76f77890?ixlib=rb-4.0.3&auto=format&fit=crop&w=600&h=300".to_string(),
      published: Some(true),
    },
    NewArticle {
      title: "Top 5 Motorcycle Routes in Tunisia You Must Experience"
        .to_string(),
      content: "Tunisia offers some of the most spectacular motorcycle \
        routes in North Africa. From coastal roads along the Mediterranean \
        to mountain passes in the Atlas Mountains, discover the best \
        riding experiences..."
        .to_string(),
      excerpt: "Discover the most breathtaking motorcycle routes across \
        Tunisia, from coastal roads to mountain passes..."
        .to_string(),
      author: "Omar Kasmi".to_string(),
      category: "travel".to_string(),
      image_url: "https://images.unsplash.com/photo-1558618666-fcd25c85cd64?ixlib=rb-4.0.3&auto=format&fit=crop&w=600&h=300".to_string(),
      published: Some(true),
    },
  ]
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::storage::memory::MemStorage;

  #[test]
  fn seeds_the_full_catalog_once() {
    let storage = MemStorage::new();
    run(&storage).unwrap();
    assert_eq!(19, storage.motorcycles().unwrap().len());
    assert_eq!(3, storage.articles().unwrap().len());
    // All seed articles ship published:
    assert_eq!(3, storage.published_articles().unwrap().len());
  }

  #[test]
  fn reseeding_inserts_nothing() {
    let storage = MemStorage::new();
    run(&storage).unwrap();
    run(&storage).unwrap();
    assert_eq!(19, storage.motorcycles().unwrap().len());
    assert_eq!(3, storage.articles().unwrap().len());
  }

  #[test]
  fn a_nonempty_table_is_left_alone() {
    let storage = MemStorage::new();
    storage
      .create_article(NewArticle {
        title: "Existing".to_string(),
        content: "c".to_string(),
        excerpt: "e".to_string(),
        author: "a".to_string(),
        category: "news".to_string(),
        image_url: "i".to_string(),
        published: None,
      })
      .unwrap();
    run(&storage).unwrap();
    // Motorcycles were empty and got seeded, articles kept
    // their single manual row:
    assert_eq!(19, storage.motorcycles().unwrap().len());
    assert_eq!(1, storage.articles().unwrap().len());
  }
}
