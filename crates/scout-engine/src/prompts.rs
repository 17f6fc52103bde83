pub const MAX_WEB_IMAGES: usize = 6;
pub const GENERATED_IMAGE_COUNT: u64 = 4;
pub const GENERATED_IMAGE_MIME: &str = "image/jpeg";
pub const GENERATED_ASPECT_RATIO: &str = "16:9";

pub fn web_search_prompt(query: &str) -> String {
    format!("Search for this and provide a concise summary: \"{query}\"")
}

/// Asks the grounded model to behave like an image search engine and answer
/// with a bare `{"images": [...]}` object.
pub fn web_image_search_prompt(query: &str) -> String {
    format!(
        "\nYour task is to act as a web image search engine for the query: '{query}'.\n\
You will be given search results. From these results, find up to {MAX_WEB_IMAGES} direct image URLs.\n\
\n\
You MUST follow these rules for your response:\n\
1.  Your entire response must be ONLY a single JSON object. No other text, no explanations, no markdown.\n\
2.  The JSON object must have a single key: \"images\". The value must be an array of image objects.\n\
3.  EACH image object in the array must contain ALL three of these keys: \"imageUrl\", \"sourceUrl\", and \"description\".\n\
4.  The \"imageUrl\" value MUST be a direct, hotlinkable URL to an image file (e.g., ends in .jpg, .png, .webp).\n\
5.  The \"sourceUrl\" value MUST be the URL of the webpage where the image was found. They must not be the same.\n\
\n\
Here is an example of a perfect response for the query \"aurora borealis\":\n\
{{\n  \"images\": [\n    {{\n      \"imageUrl\": \"https://i.natgeofe.com/n/861c26b5-1993-4179-8395-654b41b4e207/aurora-borealis-gleam-in-the-sky-over-a-snow-covered-landscape-in-norway_3x2.jpg\",\n      \"sourceUrl\": \"https://www.nationalgeographic.com/science/article/aurora-borealis-northern-lights\",\n      \"description\": \"The aurora borealis, or northern lights, over a snow-covered landscape in Norway.\"\n    }}\n  ]\n}}\n"
    )
}
