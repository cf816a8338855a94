mod output;

pub use output::{
    display_collection, display_error, display_json, display_notifications,
    display_recommendations, display_user,
};
