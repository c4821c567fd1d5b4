pub mod seen_link;
