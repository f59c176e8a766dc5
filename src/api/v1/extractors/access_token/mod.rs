/*!
 * Access token extractor
 *
 * The bearer middleware stores the verified `AccessToken` in request
 * extensions; handlers read it back through `AccessTokenExtractor`.
 *
 * - `AccessTokenExtractor`: required, 401 when no token was attached
 * - `Option<AccessTokenExtractor>`: for routes that also serve anonymous requests
 */

mod core;

pub use self::core::AccessTokenExtractor;
